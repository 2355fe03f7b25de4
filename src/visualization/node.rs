use eframe::emath::{Pos2, Vec2};
use eframe::epaint::{CircleShape, FontFamily, FontId, Shape, Stroke, TextShape};
use egui::Color32;
use egui_graphs::{DisplayNode, DrawContext, NodeProps};
use petgraph::stable_graph::IndexType;
use petgraph::EdgeType;

pub(crate) trait CutSide {
    fn kind(&self) -> NodeKind;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Source,
    Sink,
    SourceSide,
    SinkSide,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    kind: NodeKind,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl CutSide for NodeData {
    fn kind(&self) -> NodeKind {
        self.kind
    }
}

impl NodeKind {
    const SOURCE_SIDE: Color32 = Color32::from_rgb(0x80, 0x80, 0xFF);
    const SINK_SIDE: Color32 = Color32::from_rgb(0xFF, 0x80, 0x80);
    const HIGHLIGHT: f32 = 0.35;

    fn is_terminal(self) -> bool {
        matches!(self, NodeKind::Source | NodeKind::Sink)
    }

    fn fill(self, is_interacted: bool) -> Color32 {
        let base = match self {
            NodeKind::Source | NodeKind::SourceSide => Self::SOURCE_SIDE,
            NodeKind::Sink | NodeKind::SinkSide => Self::SINK_SIDE,
        };
        if is_interacted {
            lighten(base, Self::HIGHLIGHT)
        } else {
            base
        }
    }
}

fn lighten(color: Color32, amount: f32) -> Color32 {
    let channel = |c: u8| c.saturating_add(((255 - c) as f32 * amount) as u8);
    Color32::from_rgb(channel(color.r()), channel(color.g()), channel(color.b()))
}

#[derive(Clone)]
pub(crate) struct CutNodeShape {
    pos: Pos2,
    label_text: String,
    selected: bool,
    dragged: bool,

    radius: f32,
    kind: NodeKind,
}

impl<N: Clone + CutSide> From<NodeProps<N>> for CutNodeShape {
    fn from(node_props: NodeProps<N>) -> Self {
        let kind = node_props.payload.kind();
        Self {
            pos: node_props.location,
            label_text: node_props.label.to_string(),
            selected: node_props.selected,
            dragged: node_props.dragged,
            // terminals are drawn larger than inner nodes
            radius: if kind.is_terminal() { 8.0 } else { 5.0 },
            kind,
        }
    }
}

impl<N: Clone + CutSide, E: Clone, Ty: EdgeType, Ix: IndexType> DisplayNode<N, E, Ty, Ix>
    for CutNodeShape
{
    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        self.pos + dir.normalized() * self.radius
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        let is_interacted = self.selected || self.dragged;
        let center = ctx.meta.canvas_to_screen_pos(self.pos);
        let radius = ctx.meta.canvas_to_screen_size(self.radius);

        let ring_color = ctx.ctx.style().visuals.widgets.active.fg_stroke.color;
        let ring = match self.kind.is_terminal() {
            true => Stroke::new(radius / 4., ring_color),
            false => Stroke::default(),
        };
        let circle = CircleShape {
            center,
            radius,
            fill: self.kind.fill(is_interacted),
            stroke: ring,
        };

        let galley = ctx.ctx.fonts(|fonts| {
            fonts.layout_no_wrap(
                self.label_text.clone(),
                FontId::new(radius, FontFamily::Monospace),
                Color32::BLACK,
            )
        });
        let label_pos = center - galley.size() / 2.;
        let label = TextShape::new(label_pos, galley, Color32::BLACK);

        vec![circle.into(), label.into()]
    }

    fn update(&mut self, state: &NodeProps<N>) {
        self.pos = state.location;
        self.label_text = state.label.to_string();
        self.selected = state.selected;
        self.dragged = state.dragged;
        self.kind = state.payload.kind();
    }

    fn is_inside(&self, pos: Pos2) -> bool {
        (pos - self.pos).length() <= self.radius
    }
}
