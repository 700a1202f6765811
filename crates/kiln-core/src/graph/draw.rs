//! Graphviz rendering of the dependency graph.

use std::fmt::{self, Write};

use tracing::debug;

use kiln_schema::PackageName;

use super::{DependencyGraph, DependencyNode};
use crate::source::PackageSource;

const LABEL_WIDTH: usize = 20;

/// Which neighbours of the selected packages are drawn along with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Packages rebuilt because of the selection.
    #[default]
    Dependents,
    /// Packages the selection depends on.
    Dependencies,
}

/// What [`DependencyGraph::draw_with`] renders.
#[derive(Debug, Clone, Default)]
pub struct DrawOptions {
    /// Also draw build requirements no package of the graph produces.
    pub external: bool,
    /// Packages to start from; empty draws the whole graph.
    pub packages: Vec<PackageName>,
    /// Neighbours followed from `packages`.
    pub direction: Direction,
}

impl<P: PackageSource> DependencyGraph<P> {
    /// DOT document of `packages` and everything rebuilt because of them,
    /// or of the whole graph when `packages` is empty.
    pub fn draw(&self, external: bool, packages: &[PackageName]) -> String {
        self.draw_with(&DrawOptions {
            external,
            packages: packages.to_vec(),
            direction: Direction::Dependents,
        })
    }

    /// DOT document for `options`.
    pub fn draw_with(&self, options: &DrawOptions) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_dot(&mut out, options);
        out
    }

    /// Write the DOT document for `options` into `out`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying writer.
    pub fn write_dot<W: Write>(&self, out: &mut W, options: &DrawOptions) -> fmt::Result {
        let represented = self.represented(options);
        let external = if options.external {
            self.external_requirements(&represented)
        } else {
            Vec::new()
        };

        // Unrelated packages spread out better on a circle.
        let layout = if options.external || !options.packages.is_empty() {
            "dot"
        } else {
            "circo"
        };
        writeln!(out, "digraph kiln {{")?;
        writeln!(out, "  layout={layout}")?;
        writeln!(out, "  fontname=\"Helvetica,Arial,sans-serif\"")?;
        writeln!(
            out,
            "  node [fontname=\"Helvetica,Arial,sans-serif\", style=filled, fillcolor=white, \
             penwidth=1, fontsize=8, shape=Mrecord, height=0.25]"
        )?;
        writeln!(
            out,
            "  edge [fontname=\"Helvetica,Arial,sans-serif\", fontsize=6, fontcolor=\"#444444\"]"
        )?;

        for &id in &represented {
            let node = &self.nodes[id];
            writeln!(out, "  {} [ label = {} ];", quote(node.name()), html_label(node))?;
        }
        for requirement in &external {
            writeln!(out, "  {} [fillcolor=orange];", quote(requirement))?;
        }

        for &id in &represented {
            let node = &self.nodes[id];
            for &rdep_id in &node.rdeps {
                if !represented.contains(&rdep_id) {
                    continue;
                }
                let rdep = &self.nodes[rdep_id];
                let label = textwrap::wrap(&node.reason_for(rdep), LABEL_WIDTH).join("\n");
                writeln!(
                    out,
                    "  {} -> {} [ label = {} ];",
                    quote(rdep.name()),
                    quote(node.name()),
                    quote(&label)
                )?;
            }
            for requirement in node.build_requirements() {
                if external.contains(requirement) {
                    writeln!(out, "  {} -> {};", quote(node.name()), quote(requirement))?;
                }
            }
        }
        writeln!(out, "}}")
    }

    /// Node ids to draw, in discovery order.
    fn represented(&self, options: &DrawOptions) -> Vec<usize> {
        if options.packages.is_empty() {
            debug!("Drawing all project packages");
            return (0..self.nodes.len()).collect();
        }
        debug!(
            "Drawing packages {:?} with their {:?}",
            options.packages, options.direction
        );

        let mut represented = Vec::new();
        let mut stack: Vec<usize> = options
            .packages
            .iter()
            .filter_map(|name| self.position(name))
            .rev()
            .collect();
        while let Some(id) = stack.pop() {
            if represented.contains(&id) {
                continue;
            }
            represented.push(id);
            let next: Vec<usize> = match options.direction {
                Direction::Dependents => self.nodes[id].rdeps.clone(),
                Direction::Dependencies => (0..self.nodes.len())
                    .filter(|&other| self.nodes[other].rdeps.contains(&id))
                    .collect(),
            };
            stack.extend(next.into_iter().rev());
        }
        represented
    }

    /// Build requirements of the represented nodes that no node of the graph
    /// produces, in first-seen order.
    fn external_requirements(&self, represented: &[usize]) -> Vec<String> {
        let mut external: Vec<String> = Vec::new();
        for &id in represented {
            for requirement in self.nodes[id].build_requirements() {
                let produced = self
                    .nodes
                    .iter()
                    .any(|node| node.produced_artifacts().contains(requirement));
                if !produced && !external.contains(requirement) {
                    external.push(requirement.clone());
                }
            }
        }
        external
    }
}

fn html_label<P: PackageSource>(node: &DependencyNode<P>) -> String {
    let mut label = String::from(
        "<<table border=\"0\" cellborder=\"0\" cellpadding=\"1\"><tr>\
         <td bgcolor=\"#555555\" align=\"center\">",
    );
    let _ = write!(
        label,
        "<font color=\"white\">{}</font></td></tr>",
        escape_html(node.name())
    );
    for artifact in node.produced_artifacts() {
        let _ = write!(
            label,
            "<tr><td align=\"center\">{}</td></tr>",
            escape_html(artifact)
        );
    }
    label.push_str("</table>>");
    label
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// DOT quoted identifier. Line breaks become centered `\n` escapes.
fn quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
