//! Arena autograd: every scalar of one forward pass lives in a flat node list indexed by [`NodeId`].

use crate::autograd::Arithmetic;

/// Index of a node inside a [`Graph`].
///
/// Only meaningful for the graph that produced it; graphs are built fresh for every document
/// and dropped after the optimizer step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Producing operation of a node, with operand indices.
#[derive(Clone, Copy, Debug)]
enum Op {
    Leaf,
    Add(usize, usize),
    Mul(usize, usize),
    Pow(usize, f64),
    Log(usize),
    Exp(usize),
    Relu(usize),
}

#[derive(Clone, Debug)]
struct Node {
    data: f64,
    grad: f64,
    op: Op,
}

/// Computation graph of one forward/backward pass.
///
/// Operands always precede their results in the arena, so the graph is acyclic by construction.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Adds a leaf (a parameter or an input) with zero gradient.
    pub fn leaf(&mut self, data: f64) -> NodeId {
        self.push(data, Op::Leaf)
    }

    /// Number of nodes recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when no node has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gradient accumulated on `id` by every backward call so far.
    #[must_use]
    pub fn grad(&self, id: NodeId) -> f64 {
        self.nodes[id.0].grad
    }

    fn push(&mut self, data: f64, op: Op) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            grad: 0.0,
            op,
        });
        NodeId(id)
    }

    /// Post-order depth-first traversal from `root`: every reachable node exactly once,
    /// operands before the nodes that consume them.
    fn topo_order(&self, root: usize) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        // (node, operands already pushed)
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if visited[id] {
                continue;
            }
            visited[id] = true;
            stack.push((id, true));
            match self.nodes[id].op {
                Op::Add(a, b) | Op::Mul(a, b) => {
                    stack.push((b, false));
                    stack.push((a, false));
                }
                Op::Pow(a, _) | Op::Log(a) | Op::Exp(a) | Op::Relu(a) => stack.push((a, false)),
                Op::Leaf => {}
            }
        }
        order
    }

    /// Backpropagates from `root`, seeding `d root / d root = 1`.
    ///
    /// Gradients only ever accumulate. On a repeated call every reachable node, interior ones
    /// included, propagates its whole stored gradient again, so nodes shared with an earlier
    /// root pass their earlier contribution on a second time.
    pub fn backward(&mut self, root: NodeId) {
        let order = self.topo_order(root.0);
        self.nodes[root.0].grad = 1.0;

        for &id in order.iter().rev() {
            let grad = self.nodes[id].grad;
            match self.nodes[id].op {
                Op::Add(a, b) => {
                    self.nodes[a].grad += grad;
                    self.nodes[b].grad += grad;
                }
                Op::Mul(a, b) => {
                    let a_data = self.nodes[a].data;
                    let b_data = self.nodes[b].data;
                    self.nodes[a].grad += b_data * grad;
                    self.nodes[b].grad += a_data * grad;
                }
                Op::Pow(a, exp) => {
                    let a_data = self.nodes[a].data;
                    self.nodes[a].grad += exp * a_data.powf(exp - 1.0) * grad;
                }
                Op::Log(a) => {
                    let a_data = self.nodes[a].data;
                    self.nodes[a].grad += (1.0 / a_data) * grad;
                }
                Op::Exp(a) => {
                    let out = self.nodes[id].data;
                    self.nodes[a].grad += out * grad;
                }
                Op::Relu(a) => {
                    if self.nodes[id].data > 0.0 {
                        self.nodes[a].grad += grad;
                    }
                }
                Op::Leaf => {}
            }
        }
    }
}

impl Arithmetic for Graph {
    type Value = NodeId;

    fn constant(&mut self, x: f64) -> NodeId {
        self.leaf(x)
    }

    fn data(&self, v: NodeId) -> f64 {
        self.nodes[v.0].data
    }

    fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let data = self.nodes[a.0].data + self.nodes[b.0].data;
        self.push(data, Op::Add(a.0, b.0))
    }

    fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let data = self.nodes[a.0].data * self.nodes[b.0].data;
        self.push(data, Op::Mul(a.0, b.0))
    }

    fn pow(&mut self, a: NodeId, exp: f64) -> NodeId {
        let data = self.nodes[a.0].data.powf(exp);
        self.push(data, Op::Pow(a.0, exp))
    }

    fn log(&mut self, a: NodeId) -> NodeId {
        let data = self.nodes[a.0].data.ln();
        self.push(data, Op::Log(a.0))
    }

    fn exp(&mut self, a: NodeId) -> NodeId {
        let data = self.nodes[a.0].data.exp();
        self.push(data, Op::Exp(a.0))
    }

    fn relu(&mut self, a: NodeId) -> NodeId {
        let data = self.nodes[a.0].data.max(0.0);
        self.push(data, Op::Relu(a.0))
    }
}
