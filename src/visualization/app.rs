use eframe::{run_native, App, CreationContext};
use egui::{Context, Style, Visuals};
use egui_graphs::{GraphView, SettingsInteraction, SettingsStyle};
use flow_cut::{FlowNetwork, MinCut};
use petgraph::prelude::StableDiGraph;
use petgraph::stable_graph::{DefaultIx, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Directed;

use crate::visualization::edge::{EdgeData, FlowEdgeShape};
use crate::visualization::node::{CutNodeShape, NodeData, NodeKind};

type CutGraph =
    egui_graphs::Graph<NodeData, EdgeData, Directed, DefaultIx, CutNodeShape, FlowEdgeShape>;

struct GraphApp {
    graph: CutGraph,
}

impl GraphApp {
    fn new(graph: CutGraph, _: &CreationContext<'_>) -> Self {
        Self { graph }
    }
}

impl App for GraphApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        let settings_style = &SettingsStyle::new().with_labels_always(true);
        let interaction_settings = &SettingsInteraction::new()
            .with_dragging_enabled(true)
            .with_node_clicking_enabled(true)
            .with_node_selection_enabled(true);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(
                &mut GraphView::<_, _, _, _, CutNodeShape, FlowEdgeShape>::new(&mut self.graph)
                    .with_styles(settings_style)
                    .with_interactions(interaction_settings),
            );
        });
    }
}

/// Forward arcs of a solved network, with nodes coloured by cut side.
fn generate_graph(network: &FlowNetwork, cut: &MinCut) -> CutGraph {
    let mut g = StableDiGraph::with_capacity(network.node_count(), network.edge_count());

    (0usize..network.node_count()).for_each(|node| {
        let kind = if node == cut.source {
            NodeKind::Source
        } else if node == cut.sink {
            NodeKind::Sink
        } else if cut.is_source_side(node) {
            NodeKind::SourceSide
        } else {
            NodeKind::SinkSide
        };
        g.add_node(NodeData::new(kind));
    });

    network
        .arcs()
        .filter(|edge| edge.weight().is_forward())
        .for_each(|edge| {
            let arc = edge.weight();
            g.add_edge(
                NodeIndex::new(edge.source().index()),
                NodeIndex::new(edge.target().index()),
                EdgeData::new(cut.is_cut_arc(edge.id()), arc.flow(), arc.original()),
            );
        });

    egui_graphs::Graph::from(&g)
}

/// Opens a window showing `network` split by `cut`, cut arcs highlighted.
pub fn draw_network(network: &FlowNetwork, cut: &MinCut) -> eframe::Result<()> {
    let graph = generate_graph(network, cut);
    let native_options = eframe::NativeOptions::default();
    run_native(
        "Minimum Cut",
        native_options,
        Box::new(|cc| {
            // Set to dark mode always
            let style = Style {
                visuals: Visuals::dark(),
                ..Style::default()
            };
            cc.egui_ctx.set_style(style);
            Box::new(GraphApp::new(graph, cc))
        }),
    )
}
