use crate::config::{LayoutConfig, Theme};
use crate::layout::{AttributeFlags, CardinalityLabel, LabelAnchor, LayoutResult, Link, Node, NodeKind};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders a layout as a Chen-notation SVG document.
///
/// Coordinates are taken from the layout as-is, so a layout mutated by
/// dragging renders with its current positions.
#[derive(Default)]
pub struct SvgRenderer {
    config: LayoutConfig,
    theme: Theme,
}

impl SvgRenderer {
    pub fn new(config: LayoutConfig, theme: Theme) -> Self {
        Self { config, theme }
    }

    pub fn render(&self, layout: &LayoutResult) -> String {
        let mut svg = String::new();
        let vb = &layout.view_box;

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}">"#,
            vb.width, vb.height, vb
        )
        .unwrap();

        let t = &self.theme;
        writeln!(
            &mut svg,
            r#"<style>
  svg {{ font-family: {font}; }}
  .link {{ stroke: {line}; stroke-width: 1; }}
  .link.dashed {{ stroke-dasharray: 4,4; }}
  .entity {{ fill: {entity_fill}; stroke: {border}; }}
  .attribute {{ fill: {attr_fill}; stroke: {line}; }}
  .attribute.derived {{ stroke-dasharray: 4,4; }}
  .attribute-inner {{ fill: none; stroke: {line}; }}
  .relationship {{ fill: {rel_fill}; stroke: {border}; }}
  .entity-name {{ font-size: {entity_size}px; font-weight: bold; }}
  .attribute-name {{ font-size: {attr_size}px; }}
  .attribute-name.pk {{ text-decoration: underline; }}
  .relationship-name {{ font-size: {attr_size}px; font-weight: 500; }}
  .plate {{ fill: {plate}; stroke: none; }}
  .cardinality {{ fill: {card}; font-size: {card_size}px; font-weight: bold; }}
</style>"#,
            font = escape_xml(&t.font_family),
            line = t.line_color,
            border = t.border,
            entity_fill = t.entity_fill,
            attr_fill = t.attribute_fill,
            rel_fill = t.relationship_fill,
            plate = t.plate_fill,
            card = t.cardinality_color,
            entity_size = t.entity_font_size,
            attr_size = t.attribute_font_size,
            card_size = t.cardinality_font_size,
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" />"#,
            vb.min_x, vb.min_y, vb.width, vb.height, t.background
        )
        .unwrap();

        let node_map: HashMap<&str, &Node> =
            layout.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        // Lines behind shapes
        for link in &layout.links {
            self.render_link(&mut svg, link, &node_map);
        }

        for node in &layout.nodes {
            self.render_node(&mut svg, node);
        }

        // Labels on top so plates mask crossing lines
        for label in &layout.labels {
            self.render_label(&mut svg, label);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_link(&self, svg: &mut String, link: &Link, nodes: &HashMap<&str, &Node>) {
        let (Some(source), Some(target)) = (
            nodes.get(link.source.as_str()),
            nodes.get(link.target.as_str()),
        ) else {
            return;
        };
        let class = if link.is_dashed { "link dashed" } else { "link" };
        writeln!(
            svg,
            r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
            class, source.x, source.y, target.x, target.y
        )
        .unwrap();
    }

    fn render_node(&self, svg: &mut String, node: &Node) {
        let (x, y) = (node.x, node.y);
        writeln!(svg, r#"<g class="node" data-id="{}">"#, escape_xml(&node.id)).unwrap();

        match &node.kind {
            NodeKind::Entity { is_weak } => {
                let (w, h) = (self.config.entity.width, self.config.entity.height);
                writeln!(
                    svg,
                    r#"<rect class="entity" x="{}" y="{}" width="{}" height="{}" stroke-width="{}" />"#,
                    x - w / 2.0,
                    y - h / 2.0,
                    w,
                    h,
                    if *is_weak { 2 } else { 1 }
                )
                .unwrap();
                writeln!(
                    svg,
                    r#"<text class="entity-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
                    x,
                    y + 5.0,
                    escape_xml(&node.label)
                )
                .unwrap();
            }
            NodeKind::Attribute(flags) | NodeKind::RelAttribute(flags) => {
                self.render_attribute(svg, node, flags);
            }
            NodeKind::Relationship { is_identifying, .. } => {
                let hw = self.config.relationship.width / 2.0;
                let hh = self.config.relationship.height / 2.0;
                writeln!(
                    svg,
                    r#"<polygon class="relationship" points="{},{} {},{} {},{} {},{}" stroke-width="{}" />"#,
                    x,
                    y - hh,
                    x + hw,
                    y,
                    x,
                    y + hh,
                    x - hw,
                    y,
                    if *is_identifying { 2 } else { 1 }
                )
                .unwrap();
                writeln!(
                    svg,
                    r#"<text class="relationship-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
                    x,
                    y + 5.0,
                    escape_xml(&node.label)
                )
                .unwrap();
            }
        }

        writeln!(svg, "</g>").unwrap();
    }

    fn render_attribute(&self, svg: &mut String, node: &Node, flags: &AttributeFlags) {
        let (rx, ry) = (self.config.attribute_rx, self.config.attribute_ry);
        let class = if flags.is_derived { "attribute derived" } else { "attribute" };
        writeln!(
            svg,
            r#"<ellipse class="{}" cx="{}" cy="{}" rx="{}" ry="{}" />"#,
            class, node.x, node.y, rx, ry
        )
        .unwrap();

        // Multi-valued attributes get a double outline
        if flags.is_mv {
            writeln!(
                svg,
                r#"<ellipse class="attribute-inner" cx="{}" cy="{}" rx="{}" ry="{}" />"#,
                node.x,
                node.y,
                rx - 5.0,
                ry - 5.0
            )
            .unwrap();
        }

        let class = if flags.is_pk { "attribute-name pk" } else { "attribute-name" };
        writeln!(
            svg,
            r#"<text class="{}" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            class,
            node.x,
            node.y + 5.0,
            escape_xml(&node.label)
        )
        .unwrap();
    }

    fn render_label(&self, svg: &mut String, label: &CardinalityLabel) {
        for anchor in [&label.from, &label.to] {
            self.render_plate(svg, anchor);
        }
        for anchor in [&label.from, &label.to] {
            writeln!(
                svg,
                r#"<text class="cardinality" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
                anchor.position.x,
                anchor.position.y,
                escape_xml(&anchor.text)
            )
            .unwrap();
        }
    }

    fn render_plate(&self, svg: &mut String, anchor: &LabelAnchor) {
        let p = &anchor.plate;
        writeln!(
            svg,
            r#"<rect class="plate" x="{}" y="{}" width="{}" height="{}" rx="{}" />"#,
            p.x, p.y, p.width, p.height, p.radius
        )
        .unwrap();
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
