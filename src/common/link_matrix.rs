//! Received-power matrix over every ordered pair of scene nodes.

use std::fmt;

use super::scene::Scene;
use crate::propagation::PropagationLossModel;
use crate::propagation::signal_calculations::dbm_to_mw;

/// One directed link evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub tx_node_id: u32,
    pub rx_node_id: u32,
    /// Distance between the nodes in meters.
    pub distance: f64,
    /// Received power in dBm.
    pub rx_power: f64,
    /// Whether `rx_power` reaches the scene's sensitivity; `None` when the
    /// scene has no sensitivity.
    pub reachable: Option<bool>,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6} -> {:<6} distance={:>10.2}m rx_power={:>9.3}dBm ({:.3e}mW)",
            self.tx_node_id,
            self.rx_node_id,
            self.distance,
            self.rx_power,
            dbm_to_mw(self.rx_power)
        )?;
        match self.reachable {
            Some(true) => write!(f, " reachable"),
            Some(false) => write!(f, " unreachable"),
            None => Ok(()),
        }
    }
}

/// Directed links in transmitter-major node order.
#[derive(Debug, Clone, Default)]
pub struct LinkMatrix {
    pub node_ids: Vec<u32>,
    pub links: Vec<Link>,
}

impl LinkMatrix {
    /// Evaluate every ordered `tx != rx` pair.
    ///
    /// Pairs are visited in node order, transmitter-major, so with a seeded
    /// model the result is reproducible draw-for-draw.
    pub fn compute(scene: &Scene, model: &mut dyn PropagationLossModel) -> Self {
        let mut links = Vec::new();
        for tx in &scene.nodes {
            for rx in &scene.nodes {
                if tx.node_id == rx.node_id {
                    continue;
                }
                let distance = tx.position.distance_to(&rx.position);
                let rx_power = model.calc_rx_power(tx.tx_power, distance);
                links.push(Link {
                    tx_node_id: tx.node_id,
                    rx_node_id: rx.node_id,
                    distance,
                    rx_power,
                    reachable: scene.rx_sensitivity.map(|s| rx_power >= s),
                });
            }
        }
        Self {
            node_ids: scene.nodes.iter().map(|n| n.node_id).collect(),
            links,
        }
    }

    pub fn get(&self, tx_node_id: u32, rx_node_id: u32) -> Option<&Link> {
        self.links.iter().find(|l| l.tx_node_id == tx_node_id && l.rx_node_id == rx_node_id)
    }

    /// Number of links that reach the sensitivity threshold.
    pub fn reachable_count(&self) -> usize {
        self.links.iter().filter(|l| l.reachable == Some(true)).count()
    }
}
