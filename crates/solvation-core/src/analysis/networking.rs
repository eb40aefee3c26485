use super::fraction;
use crate::engine::error::EngineError;
use crate::engine::solvation_data::SolvationData;
use crate::workflows::solution::Solution;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What kind of residue a network member is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    Solute,
    Solvent(String),
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Solute => write!(f, "solute"),
            MemberKind::Solvent(name) => write!(f, "{}", name),
        }
    }
}

/// One residue of a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMember {
    pub kind: MemberKind,
    pub res_ix: usize,
}

/// Fractions of solute instances that are alone, paired, or part of a larger network.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SoluteStatus {
    pub alone: f64,
    pub paired: f64,
    pub in_network: f64,
}

/// Solute–solvent networks.
///
/// In each frame, solute residues and the residues of the selected solvents form an
/// undirected bipartite graph with an edge for every coordination. Each connected
/// component is a network. Networks are numbered per frame from zero in order of their
/// first node, solvent residues (ascending) coming before solute residues (ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct Networking {
    solvents: Vec<String>,
    networks: BTreeMap<(usize, usize), Vec<NetworkMember>>,
    network_sizes: BTreeMap<usize, BTreeMap<usize, usize>>,
    solute_status: SoluteStatus,
    solute_status_by_frame: Vec<SoluteStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Node<'a> {
    Solvent(usize, &'a str),
    Solute(usize),
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, i: usize, j: usize) {
        let (pi, pj) = (self.find(i), self.find(j));
        if pi == pj {
            return;
        }
        match self.rank[pi].cmp(&self.rank[pj]) {
            std::cmp::Ordering::Less => self.parent[pi] = pj,
            std::cmp::Ordering::Greater => self.parent[pj] = pi,
            std::cmp::Ordering::Equal => {
                self.parent[pj] = pi;
                self.rank[pi] += 1;
            }
        }
    }
}

impl Networking {
    /// # Arguments
    ///
    /// * `data` - Solvation data of the solution.
    /// * `solvents` - Solvents allowed to link solutes into networks.
    /// * `solute_res_ix` - Residue index of every solute atom, by position in the solute group.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownSolvent`] if `solvents` names a solvent absent from
    /// `data`, or [`EngineError::Internal`] if `solute_res_ix` does not cover every solute.
    pub fn new(
        data: &SolvationData,
        solvents: &[String],
        solute_res_ix: &[usize],
    ) -> Result<Self, EngineError> {
        if let Some(unknown) = solvents
            .iter()
            .find(|name| !data.solvent_names().contains(name))
        {
            return Err(EngineError::UnknownSolvent(unknown.clone()));
        }
        if solute_res_ix.len() != data.n_solutes() {
            return Err(EngineError::Internal(format!(
                "{} solute residue indices given for {} solutes",
                solute_res_ix.len(),
                data.n_solutes()
            )));
        }

        let mut edges_by_frame: Vec<BTreeSet<(Node, Node)>> =
            vec![BTreeSet::new(); data.n_frames()];
        for r in data.records() {
            if !solvents.contains(&r.res_name) {
                continue;
            }
            edges_by_frame[r.frame].insert((
                Node::Solvent(r.res_ix, r.res_name.as_str()),
                Node::Solute(solute_res_ix[r.solute_ix]),
            ));
        }

        let mut networks = BTreeMap::new();
        let mut network_sizes = BTreeMap::new();
        let mut solute_status_by_frame = Vec::with_capacity(data.n_frames());

        for (frame, edges) in edges_by_frame.iter().enumerate() {
            let components = connected_components(edges);

            let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
            let mut size_of_solute: BTreeMap<usize, usize> = BTreeMap::new();
            for (network, members) in components.into_iter().enumerate() {
                *sizes.entry(members.len()).or_insert(0) += 1;
                for member in &members {
                    if member.kind == MemberKind::Solute {
                        size_of_solute.insert(member.res_ix, members.len());
                    }
                }
                networks.insert((frame, network), members);
            }
            network_sizes.insert(frame, sizes);

            let mut status = SoluteStatus::default();
            for res_ix in solute_res_ix {
                match size_of_solute.get(res_ix) {
                    None => status.alone += 1.0,
                    Some(2) => status.paired += 1.0,
                    Some(_) => status.in_network += 1.0,
                }
            }
            let n = solute_res_ix.len() as f64;
            solute_status_by_frame.push(SoluteStatus {
                alone: fraction(status.alone, n),
                paired: fraction(status.paired, n),
                in_network: fraction(status.in_network, n),
            });
        }

        let solute_status = mean_status(&solute_status_by_frame);
        let mut solvents = solvents.to_vec();
        solvents.sort();
        solvents.dedup();

        Ok(Self {
            solvents,
            networks,
            network_sizes,
            solute_status,
            solute_status_by_frame,
        })
    }

    pub fn from_solution(solution: &Solution, solvents: &[String]) -> Result<Self, EngineError> {
        Self::new(solution.solvation_data()?, solvents, solution.solute_res_ix())
    }

    /// Solvents that link networks.
    pub fn solvents(&self) -> &[String] {
        &self.solvents
    }

    /// Members of every network, keyed by `(frame, network)`.
    pub fn networks(&self) -> &BTreeMap<(usize, usize), Vec<NetworkMember>> {
        &self.networks
    }

    /// Number of networks of each size (in residues), per frame.
    pub fn network_sizes(&self) -> &BTreeMap<usize, BTreeMap<usize, usize>> {
        &self.network_sizes
    }

    pub fn solute_status(&self) -> SoluteStatus {
        self.solute_status
    }

    pub fn solute_status_by_frame(&self) -> &[SoluteStatus] {
        &self.solute_status_by_frame
    }

    /// Residue indices of every member of one network, in member order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NetworkNotFound`] if no such network exists.
    pub fn network_res_ix(&self, frame: usize, network: usize) -> Result<Vec<usize>, EngineError> {
        self.networks
            .get(&(frame, network))
            .map(|members| members.iter().map(|m| m.res_ix).collect())
            .ok_or(EngineError::NetworkNotFound { frame, network })
    }
}

fn connected_components(edges: &BTreeSet<(Node, Node)>) -> Vec<Vec<NetworkMember>> {
    let nodes: Vec<Node> = edges
        .iter()
        .flat_map(|&(a, b)| [a, b])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index_of = |node: &Node| nodes.binary_search(node).ok();

    let mut set = DisjointSet::new(nodes.len());
    for (a, b) in edges {
        if let (Some(i), Some(j)) = (index_of(a), index_of(b)) {
            set.union(i, j);
        }
    }

    let mut component_of_root: BTreeMap<usize, usize> = BTreeMap::new();
    let mut components: Vec<Vec<NetworkMember>> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let root = set.find(i);
        let component = *component_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[component].push(match *node {
            Node::Solvent(res_ix, name) => NetworkMember {
                kind: MemberKind::Solvent(name.to_string()),
                res_ix,
            },
            Node::Solute(res_ix) => NetworkMember {
                kind: MemberKind::Solute,
                res_ix,
            },
        });
    }
    components
}

fn mean_status(by_frame: &[SoluteStatus]) -> SoluteStatus {
    let n = by_frame.len() as f64;
    let sum = by_frame.iter().fold(SoluteStatus::default(), |acc, s| SoluteStatus {
        alone: acc.alone + s.alone,
        paired: acc.paired + s.paired,
        in_network: acc.in_network + s.in_network,
    });
    SoluteStatus {
        alone: fraction(sum.alone, n),
        paired: fraction(sum.paired, n),
        in_network: fraction(sum.in_network, n),
    }
}
