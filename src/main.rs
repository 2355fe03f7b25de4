mod visualization;

use flow_cut::{Algorithm, FlowNetwork};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Example from CLRS book
    let network = FlowNetwork::from_forward_edges(
        6,
        [
            (0, 1, 16.0),
            (0, 2, 13.0),
            (1, 3, 12.0),
            (2, 1, 4.0),
            (2, 4, 14.0),
            (3, 2, 9.0),
            (3, 5, 20.0),
            (4, 3, 7.0),
            (4, 5, 4.0),
        ],
    )?;
    let (source, sink) = (0, 5);

    let mut solved = vec![];
    for algorithm in [Algorithm::PushRelabel, Algorithm::AugmentingPath] {
        let mut network = network.clone();
        let max_flow = network.solve_with(algorithm, source, sink)?;
        let cut = network.min_cut()?;
        info!(
            ?algorithm,
            max_flow,
            source_side = ?cut.source_side,
            sink_side = ?cut.sink_side,
            "solved"
        );
        solved.push((network, cut));
    }

    if let Some((network, cut)) = solved.first() {
        print!("{}", network);
        visualization::draw_network(network, cut)?;
    }

    Ok(())
}
