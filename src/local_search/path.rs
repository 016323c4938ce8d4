use super::IntVarLocalSearchOperator;
use super::LocalSearchOperator;
use crate::assignment::Assignment;
use crate::peregrine_assert_simple;
use crate::variables::IntVar;

/// Next-pointer surgery over routing paths.
///
/// Variable `i` of the `nexts` array names the successor of node `i`; a
/// value at or beyond the array length means end-of-path, and a self-loop
/// marks an inactive node. An optional parallel array of path variables
/// tracks which path each node is on and is rewritten when chains move
/// between paths.
///
/// Concrete operators own a `PathOperator` and combine its services: arc
/// inspectors ([`PathOperator::next`], [`PathOperator::is_path_end`]),
/// chain manipulators ([`PathOperator::move_chain`],
/// [`PathOperator::reverse_chain`], [`PathOperator::make_active`],
/// [`PathOperator::make_chain_inactive`]) and the base-node iteration
/// ([`PathOperator::increment_position`]), which enumerates tuples of base
/// nodes in lexicographic path order.
pub struct PathOperator {
    state: IntVarLocalSearchOperator,
    number_of_nexts: usize,
    ignore_path_vars: bool,
    /// Nodes of all paths in traversal order; the iteration space of every
    /// base node.
    node_sequence: Vec<i64>,
    /// Per base node, its index into `node_sequence`.
    base_indices: Vec<usize>,
    /// Path index per node, -1 for inactive nodes.
    path_index: Vec<i64>,
    path_starts: Vec<i64>,
    inactives: Vec<bool>,
    just_started: bool,
}

impl PathOperator {
    /// `path_vars` is either empty or exactly as long as `nexts`.
    pub fn new(nexts: Vec<IntVar>, path_vars: Vec<IntVar>, number_of_base_nodes: usize) -> Self {
        peregrine_assert_simple!(path_vars.is_empty() || path_vars.len() == nexts.len());
        let number_of_nexts = nexts.len();
        let ignore_path_vars = path_vars.is_empty();
        let mut vars = nexts;
        vars.extend(path_vars);
        PathOperator {
            state: IntVarLocalSearchOperator::new(vars),
            number_of_nexts,
            ignore_path_vars,
            node_sequence: Vec::new(),
            base_indices: vec![0; number_of_base_nodes],
            path_index: vec![-1; number_of_nexts],
            path_starts: Vec::new(),
            inactives: vec![false; number_of_nexts],
            just_started: true,
        }
    }

    pub fn number_of_nexts(&self) -> usize {
        self.number_of_nexts
    }

    /// The successor of `node` in the current proposal.
    pub fn next(&self, node: i64) -> i64 {
        peregrine_assert_simple!(!self.is_path_end(node));
        self.state.value(node as usize)
    }

    /// The successor of `node` in the base assignment.
    pub fn old_next(&self, node: i64) -> i64 {
        peregrine_assert_simple!(!self.is_path_end(node));
        self.state.old_value(node as usize)
    }

    /// The path id of `node`, 0 when paths are not tracked.
    pub fn path(&self, node: i64) -> i64 {
        if self.ignore_path_vars {
            0
        } else {
            self.state.value(self.number_of_nexts + node as usize)
        }
    }

    /// Whether `node` lies beyond the nexts array and therefore terminates
    /// a path.
    pub fn is_path_end(&self, node: i64) -> bool {
        node >= self.number_of_nexts as i64
    }

    pub fn is_inactive(&self, node: i64) -> bool {
        !self.is_path_end(node) && self.inactives[node as usize]
    }

    /// The nodes currently not on any path.
    pub fn inactive_nodes(&self) -> Vec<i64> {
        (0..self.number_of_nexts as i64)
            .filter(|&node| self.inactives[node as usize])
            .collect()
    }

    /// The `k`-th base node of the current neighborhood position.
    pub fn base_node(&self, k: usize) -> i64 {
        self.node_sequence[self.base_indices[k]]
    }

    /// The start of the path the `k`-th base node lies on.
    pub fn start_node(&self, k: usize) -> i64 {
        self.path_starts[self.path_index[self.base_node(k) as usize] as usize]
    }

    /// Make `to` the successor of `from`, rewriting `from`'s path variable
    /// when paths are tracked.
    pub fn set_next(&mut self, from: i64, to: i64, path: i64) {
        peregrine_assert_simple!(!self.is_path_end(from));
        self.state.set_value(from as usize, to);
        if !self.ignore_path_vars {
            self.state.set_value(self.number_of_nexts + from as usize, path);
        }
    }

    /// Splice the chain `(next(before_chain) ..= chain_end)` out of its
    /// path and back in after `destination`. Rejects malformed chains and
    /// destinations inside the chain.
    pub fn move_chain(&mut self, before_chain: i64, chain_end: i64, destination: i64) -> bool {
        if self.is_path_end(before_chain)
            || self.is_path_end(destination)
            || before_chain == destination
            || chain_end == destination
            || !self.check_chain_validity(before_chain, chain_end, destination)
        {
            return false;
        }

        let chain_start = self.next(before_chain);
        let after_chain = self.next(chain_end);
        let destination_next = self.next(destination);
        let destination_path = self.path(destination);

        let mut chain = Vec::new();
        let mut node = chain_start;
        loop {
            chain.push(node);
            if node == chain_end {
                break;
            }
            node = self.next(node);
        }

        let before_path = self.path(before_chain);
        self.set_next(before_chain, after_chain, before_path);
        self.set_next(destination, chain_start, destination_path);
        self.set_next(chain_end, destination_next, destination_path);

        if !self.ignore_path_vars {
            for &node in &chain {
                self.state
                    .set_value(self.number_of_nexts + node as usize, destination_path);
            }
        }
        true
    }

    /// Reverse the chain strictly between `before_chain` and
    /// `after_chain`. Returns the new last node of the chain (the former
    /// first one), or `None` when `after_chain` is not ahead of
    /// `before_chain`.
    pub fn reverse_chain(&mut self, before_chain: i64, after_chain: i64) -> Option<i64> {
        if self.is_path_end(before_chain) {
            return None;
        }
        let mut chain = Vec::new();
        let mut node = self.next(before_chain);
        while node != after_chain {
            if self.is_path_end(node) || chain.len() > self.number_of_nexts {
                return None;
            }
            chain.push(node);
            node = self.next(node);
        }
        if chain.is_empty() {
            return None;
        }

        let path = self.path(before_chain);
        self.set_next(before_chain, chain[chain.len() - 1], path);
        for window in (1..chain.len()).rev() {
            self.set_next(chain[window], chain[window - 1], path);
        }
        self.set_next(chain[0], after_chain, path);
        Some(chain[0])
    }

    /// Insert the inactive `node` right after `destination`.
    pub fn make_active(&mut self, node: i64, destination: i64) -> bool {
        if !self.is_inactive(node) || self.is_path_end(destination) {
            return false;
        }
        let destination_path = self.path(destination);
        let destination_next = self.next(destination);
        self.set_next(node, destination_next, destination_path);
        self.set_next(destination, node, destination_path);
        true
    }

    /// Remove the chain `(next(before_chain) ..= chain_end)` from its path
    /// and mark its nodes inactive (self-loops).
    pub fn make_chain_inactive(&mut self, before_chain: i64, chain_end: i64) -> bool {
        if self.is_path_end(before_chain) || self.is_path_end(chain_end) {
            return false;
        }
        if !self.check_chain_validity(before_chain, chain_end, -1) {
            return false;
        }

        let mut chain = Vec::new();
        let mut node = self.next(before_chain);
        loop {
            chain.push(node);
            if node == chain_end {
                break;
            }
            node = self.next(node);
        }

        let path = self.path(before_chain);
        let after_chain = self.next(chain_end);
        self.set_next(before_chain, after_chain, path);
        for &node in &chain {
            self.set_next(node, node, -1);
        }
        true
    }

    /// Whether `(next(before_chain) ..= chain_end)` is a non-empty
    /// contiguous chain that does not contain `exclude`.
    pub fn check_chain_validity(&self, before_chain: i64, chain_end: i64, exclude: i64) -> bool {
        if self.is_path_end(before_chain) || before_chain == exclude {
            return false;
        }
        let mut node = self.next(before_chain);
        let mut length = 0;
        while node != chain_end {
            if self.is_path_end(node) || node == exclude || length > self.number_of_nexts {
                return false;
            }
            node = self.next(node);
            length += 1;
        }
        chain_end != exclude
    }

    /// Advance to the next tuple of base nodes, in lexicographic order
    /// over the node sequence; the rightmost base node moves fastest, and
    /// overflowing bases wrap to the first path start. Returns `false`
    /// once every tuple has been visited.
    pub fn increment_position(&mut self) -> bool {
        if self.node_sequence.is_empty() {
            return false;
        }
        if self.just_started {
            self.just_started = false;
            return true;
        }
        let length = self.node_sequence.len();
        let mut position = self.base_indices.len();
        while position > 0 {
            position -= 1;
            self.base_indices[position] += 1;
            if self.base_indices[position] < length {
                return true;
            }
            self.base_indices[position] = 0;
        }
        false
    }

    /// Forget the pending proposal.
    pub fn revert(&mut self) {
        self.state.revert_changes(false);
    }

    pub fn apply_changes(&self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        self.state.apply_changes(delta, deltadelta)
    }

    /// Synchronize with a new base assignment: recompute activity, path
    /// membership and the node sequence, and rewind the base nodes.
    pub fn start(&mut self, assignment: &Assignment) {
        self.state.start(assignment);

        let n = self.number_of_nexts;
        for node in 0..n {
            self.inactives[node] = self.state.old_value(node) == node as i64;
            self.path_index[node] = -1;
        }

        let mut has_predecessor = vec![false; n];
        for node in 0..n {
            if self.inactives[node] {
                continue;
            }
            let successor = self.state.old_value(node);
            if successor >= 0 && (successor as usize) < n {
                has_predecessor[successor as usize] = true;
            }
        }

        self.path_starts.clear();
        self.node_sequence.clear();
        for start in 0..n {
            if self.inactives[start] || has_predecessor[start] {
                continue;
            }
            let path = self.path_starts.len() as i64;
            self.path_starts.push(start as i64);
            let mut node = start as i64;
            let mut steps = 0;
            // The step bound cuts walks short on malformed next arrays.
            while 0 <= node && node < n as i64 && steps <= n {
                self.path_index[node as usize] = path;
                self.node_sequence.push(node);
                node = self.state.old_value(node as usize);
                steps += 1;
            }
        }

        self.base_indices.iter_mut().for_each(|index| *index = 0);
        self.just_started = true;
    }
}

/// Moves a chain of fixed length after another node, possibly onto another
/// path. The first base node is the predecessor of the moved chain, the
/// second the destination.
pub struct Relocate {
    path: PathOperator,
    chain_length: usize,
}

impl Relocate {
    pub fn new(nexts: Vec<IntVar>, path_vars: Vec<IntVar>, chain_length: usize) -> Self {
        peregrine_assert_simple!(chain_length >= 1);
        Relocate {
            path: PathOperator::new(nexts, path_vars, 2),
            chain_length,
        }
    }

    fn make_move(&mut self) -> bool {
        let before_chain = self.path.base_node(0);
        let destination = self.path.base_node(1);
        if self.path.is_inactive(before_chain) || self.path.is_inactive(destination) {
            return false;
        }
        let mut chain_end = self.path.next(before_chain);
        for _ in 1..self.chain_length {
            if self.path.is_path_end(chain_end) {
                return false;
            }
            chain_end = self.path.next(chain_end);
        }
        if self.path.is_path_end(chain_end) {
            return false;
        }
        self.path.move_chain(before_chain, chain_end, destination)
    }
}

impl LocalSearchOperator for Relocate {
    fn start(&mut self, assignment: &Assignment) {
        self.path.start(assignment);
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        loop {
            self.path.revert();
            if !self.path.increment_position() {
                return false;
            }
            if self.make_move() && self.path.apply_changes(delta, deltadelta) {
                return true;
            }
        }
    }
}

/// Reverses the chain between its two base nodes (the classic 2-opt
/// move). Both base nodes must lie on the same path.
pub struct TwoOpt {
    path: PathOperator,
}

impl TwoOpt {
    pub fn new(nexts: Vec<IntVar>, path_vars: Vec<IntVar>) -> Self {
        TwoOpt {
            path: PathOperator::new(nexts, path_vars, 2),
        }
    }

    fn make_move(&mut self) -> bool {
        let first = self.path.base_node(0);
        let second = self.path.base_node(1);
        if first == second
            || self.path.is_inactive(first)
            || self.path.is_inactive(second)
            || self.path.path(first) != self.path.path(second)
        {
            return false;
        }
        let after_chain = self.path.next(second);
        self.path.reverse_chain(first, after_chain).is_some()
    }
}

impl LocalSearchOperator for TwoOpt {
    fn start(&mut self, assignment: &Assignment) {
        self.path.start(assignment);
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        loop {
            self.path.revert();
            if !self.path.increment_position() {
                return false;
            }
            if self.make_move() && self.path.apply_changes(delta, deltadelta) {
                return true;
            }
        }
    }
}

/// Inserts one inactive node after the base node.
pub struct MakeActiveOperator {
    path: PathOperator,
    inactive_nodes: Vec<i64>,
    inactive_cursor: usize,
}

impl MakeActiveOperator {
    pub fn new(nexts: Vec<IntVar>, path_vars: Vec<IntVar>) -> Self {
        MakeActiveOperator {
            path: PathOperator::new(nexts, path_vars, 1),
            inactive_nodes: Vec::new(),
            inactive_cursor: 0,
        }
    }
}

impl LocalSearchOperator for MakeActiveOperator {
    fn start(&mut self, assignment: &Assignment) {
        self.path.start(assignment);
        self.inactive_nodes = self.path.inactive_nodes();
        self.inactive_cursor = self.inactive_nodes.len();
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        loop {
            self.path.revert();
            if self.inactive_cursor >= self.inactive_nodes.len() {
                if !self.path.increment_position() {
                    return false;
                }
                self.inactive_cursor = 0;
                continue;
            }
            let node = self.inactive_nodes[self.inactive_cursor];
            self.inactive_cursor += 1;
            let destination = self.path.base_node(0);
            if self.path.make_active(node, destination)
                && self.path.apply_changes(delta, deltadelta)
            {
                return true;
            }
        }
    }
}

/// Removes the successor of the base node from its path, leaving it
/// inactive.
pub struct MakeChainInactiveOperator {
    path: PathOperator,
}

impl MakeChainInactiveOperator {
    pub fn new(nexts: Vec<IntVar>, path_vars: Vec<IntVar>) -> Self {
        MakeChainInactiveOperator {
            path: PathOperator::new(nexts, path_vars, 1),
        }
    }

    fn make_move(&mut self) -> bool {
        let before_chain = self.path.base_node(0);
        if self.path.is_inactive(before_chain) {
            return false;
        }
        let chain_end = self.path.next(before_chain);
        if self.path.is_path_end(chain_end) {
            return false;
        }
        self.path.make_chain_inactive(before_chain, chain_end)
    }
}

impl LocalSearchOperator for MakeChainInactiveOperator {
    fn start(&mut self, assignment: &Assignment) {
        self.path.start(assignment);
    }

    fn make_next_neighbor(&mut self, delta: &mut Assignment, deltadelta: &mut Assignment) -> bool {
        loop {
            self.path.revert();
            if !self.path.increment_position() {
                return false;
            }
            if self.make_move() && self.path.apply_changes(delta, deltadelta) {
                return true;
            }
        }
    }
}
