use eframe::emath::{Pos2, Rot2, Vec2};
use eframe::epaint::Shape;
use egui::{Color32, Stroke};
use egui_graphs::{DisplayEdge, DisplayNode, DrawContext, EdgeProps, Node};
use petgraph::stable_graph::IndexType;
use petgraph::EdgeType;

pub(crate) trait CutMembership {
    fn in_cut(&self) -> bool;
    fn utilisation(&self) -> f32;
}

#[derive(Clone, Debug)]
pub(crate) struct EdgeData {
    in_cut: bool,
    /// Share of the capacity used by the flow, in `0..=1`.
    utilisation: f32,
}

impl EdgeData {
    pub(crate) fn new(in_cut: bool, flow: f64, capacity: f64) -> Self {
        let utilisation = match capacity > 0.0 {
            true => (flow / capacity).clamp(0.0, 1.0) as f32,
            false => 0.0,
        };
        Self {
            in_cut,
            utilisation,
        }
    }
}

impl CutMembership for EdgeData {
    fn in_cut(&self) -> bool {
        self.in_cut
    }

    fn utilisation(&self) -> f32 {
        self.utilisation
    }
}

const CUT_ARC: Color32 = Color32::from_rgb(0x90, 0xEE, 0x90);

#[derive(Clone)]
pub(crate) struct FlowEdgeShape {
    selected: bool,
    in_cut: bool,
    utilisation: f32,

    min_width: f32,
    max_width: f32,
    tip_size: f32,
    tip_angle: f32,
}

impl<E: Clone + CutMembership> From<EdgeProps<E>> for FlowEdgeShape {
    fn from(edge_props: EdgeProps<E>) -> Self {
        Self {
            selected: edge_props.selected,
            in_cut: edge_props.payload.in_cut(),
            utilisation: edge_props.payload.utilisation(),

            min_width: 1.,
            max_width: 4.,
            tip_size: 12.5,
            tip_angle: std::f32::consts::TAU / 30.,
        }
    }
}

impl FlowEdgeShape {
    /// Arcs carrying more flow are drawn thicker.
    fn width(&self) -> f32 {
        self.min_width + (self.max_width - self.min_width) * self.utilisation
    }

    /// Triangle at `end` pointing along `dir`.
    fn arrow_tip(&self, end: Pos2, dir: Vec2) -> Vec<Pos2> {
        let back = -dir * self.tip_size;
        vec![
            end,
            end + Rot2::from_angle(self.tip_angle) * back,
            end + Rot2::from_angle(-self.tip_angle) * back,
        ]
    }
}

impl<N: Clone, E: Clone + CutMembership, Ty: EdgeType, Ix: IndexType, D: DisplayNode<N, E, Ty, Ix>>
    DisplayEdge<N, E, Ty, Ix, D> for FlowEdgeShape
{
    fn shapes(
        &mut self,
        start_node: &Node<N, E, Ty, Ix, D>,
        end_node: &Node<N, E, Ty, Ix, D>,
        ctx: &DrawContext,
    ) -> Vec<Shape> {
        let color = match self.in_cut {
            true => CUT_ARC,
            false => {
                let style = match self.selected {
                    true => ctx.ctx.style().visuals.widgets.active,
                    false => ctx.ctx.style().visuals.widgets.inactive,
                };
                style.fg_stroke.color
            }
        };

        let dir = (end_node.location() - start_node.location()).normalized();
        let start = start_node.display().closest_boundary_point(dir);
        let end = end_node.display().closest_boundary_point(-dir);
        // the line stops where the arrow tip begins
        let line_end = end - dir * self.tip_size;

        let to_screen = |point: Pos2| ctx.meta.canvas_to_screen_pos(point);
        let stroke = Stroke::new(ctx.meta.canvas_to_screen_size(self.width()), color);
        let tip = self.arrow_tip(end, dir).into_iter().map(to_screen).collect();

        vec![
            Shape::line_segment([to_screen(start), to_screen(line_end)], stroke),
            Shape::convex_polygon(tip, color, Stroke::default()),
        ]
    }

    fn update(&mut self, state: &EdgeProps<E>) {
        self.selected = state.selected;
        self.in_cut = state.payload.in_cut();
        self.utilisation = state.payload.utilisation();
    }

    fn is_inside(
        &self,
        start: &Node<N, E, Ty, Ix, D>,
        end: &Node<N, E, Ty, Ix, D>,
        pos: Pos2,
    ) -> bool {
        distance_to_segment(start.location(), end.location(), pos) <= self.width()
    }
}

fn distance_to_segment(a: Pos2, b: Pos2, point: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq == 0.0 {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}
