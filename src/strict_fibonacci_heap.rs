//! Strict Fibonacci heap: worst-case O(1) `insert`, `meld`, `find_min`, and
//! `decrease_key`, worst-case O(log n) `delete_min`.
//!
//! Every node is either *active* (part of the single tree hanging off the
//! root, which is always active) or *passive* (hanging off an active node,
//! itself never violating heap order against its own parent). A node's
//! active/passive flag is not stored on the node directly: nodes share a
//! handful of "active record" cells, and flipping one cell during a `meld`
//! reclassifies every node that points at it as passive in O(1), exactly the
//! trick the reference `ActiveRecord` class performs.
//!
//! Non-root nodes also sit in exactly one FIFO queue, oldest first; each
//! `delete_min` services up to two nodes off its head, pulling a couple of
//! their passive children back up to the root so the passive backlog never
//! grows unbounded. Active non-root nodes additionally track a `rank`
//! (position in a shared rank-list) and a `loss` counter; both are kept
//! inside a bounded number of "fix-list" entries per rank, with the usual
//! single-vs-paired discipline, so `decrease_key` only ever has to drain a
//! fixed handful of fix-list entries to restore every invariant.
//!
//! Nodes and their payload are split the same way the binomial heap splits
//! them: a `nodes` forest holds tree topology and an `entries` forest holds
//! the value/priority, with a node pointing at whichever entry currently
//! sits there.

use std::cmp::Ordering;

use crate::arena::{Forest, Loc};
use crate::entry::{next_heap_id, Entry};
use crate::error::HeapError;
use crate::heap::PriorityQueue;

struct EntryRec<P, V> {
    value: V,
    prio: P,
    node: Loc,
}

/// A node's place on the shared rank line. Ranks are represented positionally
/// (not as a stored integer): `inc`/`dec` chain a node's rank record to its
/// neighbors, and a node's current rank is just "whichever record it points
/// at". `active_roots`/`loss` are the fix-list heads for nodes currently at
/// this rank.
struct RankRecord {
    inc: Option<Loc>,
    dec: Option<Loc>,
    active_roots: Option<Loc>,
    loss: Option<Loc>,
}

/// Tracks a node's membership in one of the two fix-lists (active-roots or
/// loss), kept as a standalone record so a node can leave and rejoin without
/// disturbing the rest of its rank's bucket.
struct FixRecord {
    node: Loc,
    left: Loc,
    right: Loc,
    rank: Loc,
}

struct Node {
    entry: Loc,
    parent: Option<Loc>,
    /// Sibling ring among the parent's children (self-looped when alone).
    left: Loc,
    right: Loc,
    child: Option<Loc>,
    /// FIFO queue ring; meaningless once the node becomes the root.
    qprev: Loc,
    qnext: Loc,
    /// Which active-record cell this node currently reads its active/passive
    /// status from.
    active_rec: Loc,
    rank: Loc,
    fix: Option<Loc>,
    loss: i32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FixListKind {
    ActiveRoots,
    Loss,
}

pub struct StrictFibonacciHeap<P, V> {
    heap_id: u64,
    nodes: Forest<Node>,
    entries: Forest<EntryRec<P, V>>,
    active_records: Forest<bool>,
    fix_records: Forest<FixRecord>,
    ranks: Forest<RankRecord>,
    root: Option<Loc>,
    /// The one active-record cell new active nodes are promoted onto; always
    /// holds `true` for as long as this heap lives under its own identity.
    active_record: Loc,
    rank_list: Loc,
    /// The candidate root-child next in line for a root-degree reduction;
    /// `None` when no such candidate exists.
    non_linkable: Option<Loc>,
    queue_head: Option<Loc>,
    fix_list_act_roots: Option<Loc>,
    fix_list_loss: Option<Loc>,
    size: usize,
}

impl<P: Ord, V> Default for StrictFibonacciHeap<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ord, V> StrictFibonacciHeap<P, V> {
    pub fn new() -> Self {
        let mut active_records = Forest::new();
        let active_record = active_records.insert(true);
        let mut ranks = Forest::new();
        let rank_list = ranks.insert(RankRecord { inc: None, dec: None, active_roots: None, loss: None });
        StrictFibonacciHeap {
            heap_id: next_heap_id(),
            nodes: Forest::new(),
            entries: Forest::new(),
            active_records,
            fix_records: Forest::new(),
            ranks,
            root: None,
            active_record,
            rank_list,
            non_linkable: None,
            queue_head: None,
            fix_list_act_roots: None,
            fix_list_loss: None,
            size: 0,
        }
    }

    fn check_entry(&self, entry: &Entry) -> Result<(), HeapError> {
        if entry.heap_id != self.heap_id || !self.entries.contains(entry.loc) {
            Err(HeapError::WrongHeap)
        } else {
            Ok(())
        }
    }

    fn entry_less(&self, a: Loc, b: Loc) -> bool {
        match self.entries[a].prio.cmp(&self.entries[b].prio) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => (a.arena, a.key) < (b.arena, b.key),
        }
    }

    fn node_less(&self, a: Loc, b: Loc) -> bool {
        self.entry_less(self.nodes[a].entry, self.nodes[b].entry)
    }

    fn swap_entries(&mut self, a: Loc, b: Loc) {
        let ea = self.nodes[a].entry;
        let eb = self.nodes[b].entry;
        self.nodes[a].entry = eb;
        self.nodes[b].entry = ea;
        self.entries[eb].node = a;
        self.entries[ea].node = b;
    }

    // -- node classification ------------------------------------------------

    fn node_is_root(&self, n: Loc) -> bool {
        self.nodes[n].parent.is_none()
    }

    fn node_is_son_of_root(&self, n: Loc) -> bool {
        match self.nodes[n].parent {
            Some(p) => self.nodes[p].parent.is_none(),
            None => false,
        }
    }

    /// A node violates only once it sits two or more levels below the root:
    /// a direct child of the root is never considered violating, matching
    /// the decrease-key entry-swap special case above.
    fn node_is_violating(&self, n: Loc) -> bool {
        match self.nodes[n].parent {
            Some(p) => self.nodes[p].parent.is_some() && self.node_less(n, p),
            None => false,
        }
    }

    fn node_is_active(&self, n: Loc) -> bool {
        self.active_records[self.nodes[n].active_rec]
    }

    fn node_is_passive(&self, n: Loc) -> bool {
        !self.node_is_active(n)
    }

    fn node_is_active_root(&self, n: Loc) -> bool {
        match self.nodes[n].parent {
            Some(p) => self.node_is_passive(p) && self.node_is_active(n),
            None => false,
        }
    }

    fn node_is_passive_linkable(&self, n: Loc) -> bool {
        if !self.node_is_passive(n) {
            return false;
        }
        match self.nodes[n].child {
            None => true,
            Some(c) => self.node_is_passive(c),
        }
    }

    // -- sibling-ring / child-list primitives -------------------------------

    fn new_node(&mut self) -> Loc {
        let active_rec = self.active_records.insert(false);
        let placeholder = Loc { arena: 0, key: 0 };
        let loc = self.nodes.insert(Node {
            entry: placeholder,
            parent: None,
            left: placeholder,
            right: placeholder,
            child: None,
            qprev: placeholder,
            qnext: placeholder,
            active_rec,
            rank: self.rank_list,
            fix: None,
            loss: -1,
        });
        self.nodes[loc].left = loc;
        self.nodes[loc].right = loc;
        self.nodes[loc].qprev = loc;
        self.nodes[loc].qnext = loc;
        loc
    }

    fn add_chld(&mut self, parent: Loc, child: Loc) {
        match self.nodes[parent].child {
            None => {
                self.nodes[child].left = child;
                self.nodes[child].right = child;
                self.nodes[parent].child = Some(child);
            }
            Some(c) => {
                let rightmost = self.nodes[c].left;
                self.nodes[child].left = rightmost;
                self.nodes[child].right = c;
                self.nodes[rightmost].right = child;
                self.nodes[c].left = child;
            }
        }
        self.nodes[child].parent = Some(parent);
    }

    /// Active children live at the head of the child ring, passive ones at
    /// the tail; `parent.child` always points at the current head.
    fn add_active_child(&mut self, parent: Loc, child: Loc) {
        self.add_chld(parent, child);
        self.nodes[parent].child = Some(child);
    }

    fn add_passive_child(&mut self, parent: Loc, child: Loc) {
        self.add_chld(parent, child);
    }

    fn remove_child(&mut self, parent: Loc, child: Loc) {
        self.nodes[child].parent = None;
        let left = self.nodes[child].left;
        let right = self.nodes[child].right;
        if right == child {
            self.nodes[parent].child = None;
        } else if self.nodes[parent].child == Some(child) {
            self.nodes[parent].child = Some(right);
        }
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.nodes[child].left = child;
        self.nodes[child].right = child;
    }

    fn add_after(&mut self, anchor: Loc, sibling: Loc) {
        let anchor_right = self.nodes[anchor].right;
        self.nodes[sibling].left = anchor;
        self.nodes[sibling].right = anchor_right;
        self.nodes[anchor_right].left = sibling;
        self.nodes[anchor].right = sibling;
        self.nodes[sibling].parent = self.nodes[anchor].parent;
    }

    fn disconnect_passive_child(&mut self, node: Loc) -> Option<Loc> {
        let child = self.nodes[node].child?;
        let rightmost = self.nodes[child].left;
        if self.node_is_passive(rightmost) {
            self.remove_child(node, rightmost);
            Some(rightmost)
        } else {
            None
        }
    }

    // -- queue ---------------------------------------------------------------

    fn prepend_queue(&mut self, node: Loc) {
        self.nodes[node].qprev = node;
        self.nodes[node].qnext = node;
        match self.queue_head {
            Some(head) => {
                let last = self.nodes[head].qprev;
                self.nodes[node].qprev = last;
                self.nodes[node].qnext = head;
                self.nodes[last].qnext = node;
                self.nodes[head].qprev = node;
                self.queue_head = Some(node);
            }
            None => self.queue_head = Some(node),
        }
    }

    fn remove_from_queue(&mut self, node: Loc) {
        let qnext = self.nodes[node].qnext;
        if qnext == node {
            self.queue_head = None;
        } else {
            if self.queue_head == Some(node) {
                self.queue_head = Some(qnext);
            }
            let qprev = self.nodes[node].qprev;
            self.nodes[qprev].qnext = qnext;
            self.nodes[qnext].qprev = qprev;
        }
        self.nodes[node].qprev = node;
        self.nodes[node].qnext = node;
    }

    /// Splices `x`'s and `y`'s queue rings together around `glue` (the
    /// root that just got demoted to an ordinary child by a `meld`), in O(1).
    fn concat_queues(&mut self, x_head: Option<Loc>, y_head: Option<Loc>, glue: Loc) -> Loc {
        match (x_head, y_head) {
            (None, None) => {
                self.nodes[glue].qprev = glue;
                self.nodes[glue].qnext = glue;
                glue
            }
            (None, Some(yh)) => {
                self.queue_head = Some(yh);
                self.prepend_queue(glue);
                glue
            }
            (Some(xh), None) => {
                self.queue_head = Some(xh);
                self.prepend_queue(glue);
                self.nodes[glue].qnext
            }
            (Some(xh), Some(yh)) => {
                self.queue_head = Some(yh);
                self.prepend_queue(glue);
                let glue_head = self.queue_head.expect("just set");
                let last_x = self.nodes[xh].qprev;
                let last_y = self.nodes[glue_head].qprev;
                self.nodes[last_x].qnext = glue_head;
                self.nodes[glue_head].qprev = last_x;
                self.nodes[last_y].qnext = xh;
                self.nodes[xh].qprev = last_y;
                xh
            }
        }
    }

    // -- active record / rank bookkeeping ------------------------------------

    fn make_active(&mut self, node: Loc, rank: Loc) {
        let old = self.nodes[node].active_rec;
        if old != self.active_record {
            self.active_records.remove(old);
        }
        self.nodes[node].active_rec = self.active_record;
        self.nodes[node].rank = rank;
    }

    fn make_passive_node(&mut self, node: Loc) {
        let private = self.active_records.insert(false);
        self.nodes[node].active_rec = private;
    }

    fn just_inc_rank(&mut self, node: Loc) {
        let rll = self.nodes[node].rank;
        let next = match self.ranks[rll].inc {
            Some(i) => i,
            None => {
                let fresh = self.ranks.insert(RankRecord { inc: None, dec: Some(rll), active_roots: None, loss: None });
                self.ranks[rll].inc = Some(fresh);
                fresh
            }
        };
        self.nodes[node].rank = next;
    }

    fn just_dec_rank(&mut self, node: Loc) {
        let rll = self.nodes[node].rank;
        let dec = self.ranks[rll].dec.expect("rank stays above zero while decreasing");
        self.nodes[node].rank = dec;
    }

    fn decrease_rank(&mut self, node: Loc) {
        if self.node_is_active_root(node) {
            let flr = self.nodes[node].fix.expect("active root is tracked in a fix-list");
            let rank = self.fix_records[flr].rank;
            self.rm_fl_checked(flr, FixListKind::ActiveRoots, rank);
            self.fix_records.remove(flr);
            self.nodes[node].fix = None;
            self.just_dec_rank(node);
            let new_rank = self.nodes[node].rank;
            self.add_to_fix_list(node, FixListKind::ActiveRoots, new_rank);
        } else if self.nodes[node].loss > 0 {
            let flr = self.nodes[node].fix.expect("lossy node is tracked in a fix-list");
            let rank = self.fix_records[flr].rank;
            self.rm_fl_checked(flr, FixListKind::Loss, rank);
            self.fix_records.remove(flr);
            self.nodes[node].fix = None;
            self.just_dec_rank(node);
            let new_rank = self.nodes[node].rank;
            self.add_to_fix_list(node, FixListKind::Loss, new_rank);
        }
    }

    fn increase_loss(&mut self, node: Loc) {
        let loss = self.nodes[node].loss;
        if loss <= 0 {
            let rank = self.nodes[node].rank;
            self.add_to_fix_list(node, FixListKind::Loss, rank);
            self.nodes[node].loss = 1;
        } else if loss == 1 {
            let flr = self.nodes[node].fix.expect("loss-1 node is tracked in the loss fix-list");
            if self.is_single(flr) {
                self.rm_fl_unchecked(flr, FixListKind::Loss);
                self.nodes[node].loss = 2;
                self.prepend_fix_list(flr, FixListKind::Loss);
            } else {
                self.nodes[node].loss = 2;
            }
        } else {
            self.nodes[node].loss += 1;
        }
    }

    // -- fix-list primitives --------------------------------------------------

    fn fix_list_head(&self, kind: FixListKind) -> Option<Loc> {
        match kind {
            FixListKind::ActiveRoots => self.fix_list_act_roots,
            FixListKind::Loss => self.fix_list_loss,
        }
    }

    fn set_fix_list_head(&mut self, kind: FixListKind, v: Option<Loc>) {
        match kind {
            FixListKind::ActiveRoots => self.fix_list_act_roots = v,
            FixListKind::Loss => self.fix_list_loss = v,
        }
    }

    fn rank_field(&self, rank: Loc, kind: FixListKind) -> Option<Loc> {
        match kind {
            FixListKind::ActiveRoots => self.ranks[rank].active_roots,
            FixListKind::Loss => self.ranks[rank].loss,
        }
    }

    fn set_rank_field(&mut self, rank: Loc, kind: FixListKind, v: Option<Loc>) {
        match kind {
            FixListKind::ActiveRoots => self.ranks[rank].active_roots = v,
            FixListKind::Loss => self.ranks[rank].loss = v,
        }
    }

    fn new_fix_record(&mut self, node: Loc, rank: Loc) -> Loc {
        let placeholder = Loc { arena: 0, key: 0 };
        let loc = self.fix_records.insert(FixRecord { node, left: placeholder, right: placeholder, rank });
        self.fix_records[loc].left = loc;
        self.fix_records[loc].right = loc;
        loc
    }

    fn add_after_fl_record(&mut self, after: Loc, record: Loc) {
        let after_right = self.fix_records[after].right;
        self.fix_records[record].left = after;
        self.fix_records[record].right = after_right;
        self.fix_records[after_right].left = record;
        self.fix_records[after].right = record;
    }

    fn append_fix_list(&mut self, record: Loc, kind: FixListKind) {
        match self.fix_list_head(kind) {
            Some(head) => {
                let left = self.fix_records[head].left;
                self.add_after_fl_record(left, record);
            }
            None => self.set_fix_list_head(kind, Some(record)),
        }
    }

    fn prepend_fix_list(&mut self, record: Loc, kind: FixListKind) {
        if let Some(head) = self.fix_list_head(kind) {
            let left = self.fix_records[head].left;
            self.add_after_fl_record(left, record);
        }
        self.set_fix_list_head(kind, Some(record));
    }

    fn rm_fl_unchecked(&mut self, record: Loc, kind: FixListKind) {
        let left = self.fix_records[record].left;
        let right = self.fix_records[record].right;
        let head = self.fix_list_head(kind);
        if left == record {
            self.set_fix_list_head(kind, None);
        } else if head == Some(record) {
            self.set_fix_list_head(kind, Some(right));
        }
        self.fix_records[left].right = right;
        self.fix_records[right].left = left;
    }

    fn rm_fl_checked(&mut self, record: Loc, kind: FixListKind, rank: Loc) {
        let rank_head = self.rank_field(rank, kind);
        let mut new_rank_head = rank_head;
        if rank_head == Some(record) {
            let left = self.fix_records[record].left;
            new_rank_head = if left == record {
                None
            } else {
                let right = self.fix_records[record].right;
                if self.fix_records[right].rank == rank { Some(right) } else { None }
            };
            self.set_rank_field(rank, kind, new_rank_head);
        }
        self.rm_fl_unchecked(record, kind);
        if let Some(r) = new_rank_head {
            if self.is_single(r) {
                self.rm_fl_unchecked(r, kind);
                self.append_fix_list(r, kind);
            }
        }
    }

    fn add_to_fix_list_rec(&mut self, flr: Loc, kind: FixListKind, rank: Loc) {
        match self.rank_field(rank, kind) {
            None => {
                self.set_rank_field(rank, kind, Some(flr));
                let node = self.fix_records[flr].node;
                if self.nodes[node].loss >= 2 {
                    self.prepend_fix_list(flr, kind);
                } else {
                    self.append_fix_list(flr, kind);
                }
            }
            Some(existing) => {
                if self.is_single(existing) {
                    self.rm_fl_unchecked(existing, kind);
                    self.prepend_fix_list(flr, kind);
                    self.prepend_fix_list(existing, kind);
                } else {
                    self.add_after_fl_record(existing, flr);
                }
            }
        }
    }

    fn add_to_fix_list(&mut self, node: Loc, kind: FixListKind, rank: Loc) {
        let flr = self.new_fix_record(node, rank);
        self.nodes[node].fix = Some(flr);
        self.add_to_fix_list_rec(flr, kind, rank);
    }

    /// A fix-list record is "single" when it is the only one of its rank in
    /// the list and its node has not accumulated a second loss unit; such
    /// records get treated specially so two singles at the same rank always
    /// end up paired before the list grows past them.
    fn is_single(&self, record: Loc) -> bool {
        let left = self.fix_records[record].left;
        if left == record {
            return false;
        }
        if self.nodes[self.fix_records[record].node].loss >= 2 {
            return false;
        }
        let right = self.fix_records[record].right;
        let rank = self.fix_records[record].rank;
        self.fix_records[left].rank != rank && self.fix_records[right].rank != rank
    }

    // -- root-child placement --------------------------------------------------

    fn add_root_child(&mut self, node: Loc) {
        if self.node_is_passive_linkable(node) {
            let root = self.root.expect("root exists");
            self.add_passive_child(root, node);
            return;
        }
        match self.non_linkable {
            Some(nl) => {
                if self.node_is_active(nl) {
                    self.add_after(nl, node);
                    self.non_linkable = Some(node);
                } else if self.node_is_active(node) {
                    let root = self.root.expect("root exists");
                    self.add_active_child(root, node);
                } else {
                    self.add_after(nl, node);
                }
            }
            None => {
                let root = self.root.expect("root exists");
                self.add_active_child(root, node);
                self.non_linkable = Some(node);
            }
        }
    }

    fn remove_root_child(&mut self, node: Loc) {
        let node_left = self.nodes[node].left;
        let node_right = self.nodes[node].right;
        if node == node_left {
            self.non_linkable = None;
        } else if self.non_linkable == Some(node) {
            if self.node_is_passive(node_right) && !self.node_is_passive_linkable(node_right) {
                self.non_linkable = Some(node_right);
            } else if self.node_is_active(node_left) {
                self.non_linkable = Some(node_left);
            } else {
                self.non_linkable = None;
            }
        }
        let root = self.root.expect("root exists");
        self.remove_child(root, node);
    }

    fn set_new_nonlinkable(&mut self, min: Loc) {
        let child = match self.nodes[min].child {
            None => {
                self.non_linkable = None;
                return;
            }
            Some(c) => c,
        };
        let rightmost = self.nodes[child].left;
        if self.node_is_active(rightmost) {
            self.non_linkable = Some(rightmost);
            return;
        }
        let mut nl = rightmost;
        loop {
            let nl_left = self.nodes[nl].left;
            if !self.node_is_passive(nl_left) {
                break;
            }
            if nl_left == rightmost {
                break;
            }
            nl = nl_left;
        }
        if self.node_is_passive_linkable(nl) {
            let nl_left = self.nodes[nl].left;
            self.non_linkable = if self.node_is_active(nl_left) { Some(nl_left) } else { None };
        } else {
            self.non_linkable = Some(nl);
        }
    }

    fn rootify(&mut self, min: Loc) {
        self.set_new_nonlinkable(min);
        self.root = Some(min);
        self.nodes[min].parent = None;
        self.nodes[min].left = min;
        self.nodes[min].right = min;
    }

    // -- reductions -------------------------------------------------------------

    fn sort2(&self, a: Loc, b: Loc) -> (Loc, Loc) {
        if self.node_less(b, a) { (b, a) } else { (a, b) }
    }

    fn sort3(&self, a: Loc, b: Loc, c: Loc) -> (Loc, Loc, Loc) {
        let (mut x, mut y, mut z) = (a, b, c);
        if self.node_less(y, x) { std::mem::swap(&mut x, &mut y); }
        if self.node_less(z, y) { std::mem::swap(&mut y, &mut z); }
        if self.node_less(y, x) { std::mem::swap(&mut x, &mut y); }
        (x, y, z)
    }

    fn active_root_reduce(&mut self, x: Loc, y: Loc) {
        if self.node_is_son_of_root(y) {
            self.remove_root_child(y);
        } else {
            let yp = self.nodes[y].parent.expect("violating active root has a parent");
            self.remove_child(yp, y);
        }
        self.add_active_child(x, y);
        self.just_inc_rank(x);
        if let Some(z) = self.disconnect_passive_child(x) {
            self.add_root_child(z);
        }
    }

    fn do_active_root_reduce(&mut self) -> bool {
        let fx = match self.fix_list_act_roots {
            Some(f) => f,
            None => return false,
        };
        let fy = self.fix_records[fx].right;
        let fx_rank = self.fix_records[fx].rank;
        let fy_rank = self.fix_records[fy].rank;
        if fx == fy || fx_rank != fy_rank {
            return false;
        }
        let x = self.fix_records[fx].node;
        let y = self.fix_records[fy].node;
        self.rm_fl_unchecked(fy, FixListKind::ActiveRoots);
        self.rm_fl_checked(fx, FixListKind::ActiveRoots, fx_rank);
        self.fix_records.remove(fx);
        self.fix_records.remove(fy);
        self.nodes[x].fix = None;
        self.nodes[y].fix = None;
        let (x, y) = self.sort2(x, y);
        self.active_root_reduce(x, y);
        let rank = self.nodes[x].rank;
        self.add_to_fix_list(x, FixListKind::ActiveRoots, rank);
        true
    }

    fn root_degree_reduce(&mut self, x: Loc, y: Loc, z: Loc) {
        self.make_active(x, self.rank_list);
        self.make_active(y, self.rank_list);
        self.just_inc_rank(x);
        let rank = self.nodes[x].rank;
        self.add_to_fix_list(x, FixListKind::ActiveRoots, rank);
        self.nodes[x].loss = 0;
        self.nodes[y].loss = 0;
        self.add_active_child(x, y);
        self.add_passive_child(y, z);
        self.add_root_child(x);
    }

    fn do_root_degree_reduce(&mut self) -> bool {
        let root = self.root.expect("root exists while heap nonempty");
        let child = match self.nodes[root].child {
            Some(c) => c,
            None => return false,
        };
        let x = self.nodes[child].left;
        let y = self.nodes[x].left;
        let z = self.nodes[y].left;
        if !(self.node_is_passive_linkable(x) && self.node_is_passive_linkable(y) && self.node_is_passive_linkable(z)) {
            return false;
        }
        if x == y || y == z || x == z {
            return false;
        }
        self.remove_root_child(x);
        self.remove_root_child(y);
        self.remove_root_child(z);
        let (x, y, z) = self.sort3(x, y, z);
        self.root_degree_reduce(x, y, z);
        true
    }

    fn one_node_loss_reduce(&mut self, x: Loc) {
        let y = self.nodes[x].parent.expect("loss-reduced node has a parent");
        self.remove_child(y, x);
        self.nodes[x].loss = 0;
        self.add_root_child(x);
        let rank = self.nodes[x].rank;
        self.add_to_fix_list(x, FixListKind::ActiveRoots, rank);
        self.decrease_rank(y);
        if !self.node_is_active_root(y) {
            self.increase_loss(y);
        }
    }

    fn two_node_loss_reduce(&mut self, x: Loc, y: Loc) {
        self.nodes[x].loss = 0;
        self.nodes[y].loss = 0;
        let z = self.nodes[y].parent.expect("loss-reduced node has a parent");
        self.remove_child(z, y);
        self.add_active_child(x, y);
        self.just_inc_rank(x);
        self.decrease_rank(z);
        if !self.node_is_active_root(z) {
            self.increase_loss(z);
        }
    }

    fn do_loss_reduce(&mut self) -> bool {
        let fx = match self.fix_list_loss {
            Some(f) => f,
            None => return false,
        };
        let x = self.fix_records[fx].node;
        let fx_rank = self.fix_records[fx].rank;
        if self.nodes[x].loss >= 2 {
            self.rm_fl_checked(fx, FixListKind::Loss, fx_rank);
            self.fix_records.remove(fx);
            self.nodes[x].fix = None;
            self.one_node_loss_reduce(x);
            return true;
        }
        let fy = self.fix_records[fx].right;
        let fy_rank = self.fix_records[fy].rank;
        if fy == fx || fx_rank != fy_rank {
            return false;
        }
        let y = self.fix_records[fy].node;
        if self.nodes[y].loss >= 2 {
            self.rm_fl_checked(fy, FixListKind::Loss, fy_rank);
            self.fix_records.remove(fy);
            self.nodes[y].fix = None;
            self.one_node_loss_reduce(y);
            return true;
        }
        self.rm_fl_unchecked(fy, FixListKind::Loss);
        self.rm_fl_checked(fx, FixListKind::Loss, fx_rank);
        self.fix_records.remove(fx);
        self.fix_records.remove(fy);
        self.nodes[x].fix = None;
        self.nodes[y].fix = None;
        let (x, y) = self.sort2(x, y);
        self.two_node_loss_reduce(x, y);
        true
    }

    // -- delete_min helpers -------------------------------------------------

    fn find_new_root(&self) -> Loc {
        let root = self.root.expect("root exists");
        let start = self.nodes[root].child.expect("root has children while size > 1");
        let mut best = start;
        let mut cur = self.nodes[start].right;
        while cur != start {
            if self.node_less(cur, best) {
                best = cur;
            }
            cur = self.nodes[cur].right;
        }
        best
    }

    fn make_passive(&mut self, min: Loc) {
        if !self.node_is_active(min) {
            return;
        }
        if let Some(flr) = self.nodes[min].fix {
            let rank = self.fix_records[flr].rank;
            self.rm_fl_checked(flr, FixListKind::ActiveRoots, rank);
            self.fix_records.remove(flr);
            self.nodes[min].fix = None;
        }
        self.make_passive_node(min);

        if let Some(end_it) = self.nodes[min].child {
            let mut it = end_it;
            loop {
                if !self.node_is_active(it) {
                    break;
                }
                if self.nodes[it].loss > 0 {
                    if let Some(flr) = self.nodes[it].fix {
                        let rank = self.fix_records[flr].rank;
                        self.rm_fl_checked(flr, FixListKind::Loss, rank);
                        self.fix_records.remove(flr);
                        self.nodes[it].fix = None;
                    }
                    self.nodes[it].loss = 0;
                }
                let rank = self.nodes[it].rank;
                self.add_to_fix_list(it, FixListKind::ActiveRoots, rank);
                let next = self.nodes[it].right;
                if next == end_it {
                    break;
                }
                it = next;
            }
        }
    }

    fn move_active_children(&mut self, min: Loc) {
        let root = self.root.expect("root exists");
        let first = match self.nodes[root].child {
            Some(c) => c,
            None => return,
        };
        if !self.node_is_active(first) {
            return;
        }
        let nl = self.non_linkable.expect("non_linkable set while an active child run exists");
        let last = if self.node_is_active(nl) { nl } else { self.nodes[nl].left };

        let first_left = self.nodes[first].left;
        if !self.node_is_active(first_left) {
            let rightmost = first_left;
            let last_right = self.nodes[last].right;
            self.nodes[root].child = Some(last_right);
            self.nodes[first].left = last;
            self.nodes[last].right = first;
            self.nodes[last_right].left = rightmost;
            self.nodes[rightmost].right = last_right;
        } else {
            self.nodes[root].child = None;
        }

        match self.nodes[min].child {
            None => self.nodes[min].child = Some(first),
            Some(min_child) => {
                let rightmost = self.nodes[min_child].left;
                self.nodes[min_child].left = last;
                self.nodes[last].right = min_child;
                self.nodes[rightmost].right = first;
                self.nodes[first].left = rightmost;
                self.nodes[min].child = Some(first);
            }
        }
    }

    fn move_old_children_to(&mut self, min: Loc) {
        let root = self.root.expect("root exists");
        let root_child = match self.nodes[root].child {
            None => {
                self.rootify(min);
                return;
            }
            Some(c) => c,
        };

        let mut it = root_child;
        loop {
            self.nodes[it].parent = Some(min);
            it = self.nodes[it].right;
            if it == root_child {
                break;
            }
        }

        self.move_active_children(min);

        let remaining = self.nodes[root].child;
        self.nodes[root].child = None;
        self.rootify(min);

        let Some(start) = remaining else { return };
        let mut locs = Vec::new();
        let mut cur = start;
        loop {
            let next = self.nodes[cur].right;
            locs.push(cur);
            if next == start {
                break;
            }
            cur = next;
        }
        for loc in locs {
            self.add_root_child(loc);
        }
    }
}

impl<P: Ord, V> PriorityQueue<P, V> for StrictFibonacciHeap<P, V> {
    fn insert(&mut self, value: V, prio: P) -> Entry {
        let node = self.new_node();
        let entry_loc = self.entries.insert(EntryRec { value, prio, node });
        self.nodes[node].entry = entry_loc;

        match self.root {
            None => {
                self.root = Some(node);
                self.nodes[node].left = node;
                self.nodes[node].right = node;
            }
            Some(root) => {
                if self.node_less(node, root) {
                    self.add_passive_child(node, root);
                    self.non_linkable = if self.node_is_passive_linkable(root) { None } else { Some(root) };
                    self.nodes[root].qprev = root;
                    self.nodes[root].qnext = root;
                    self.prepend_queue(root);
                    self.root = Some(node);
                } else {
                    self.add_passive_child(root, node);
                    self.prepend_queue(node);
                }
            }
        }

        while self.do_active_root_reduce() {}
        while self.do_root_degree_reduce() {}

        self.size += 1;
        Entry::new(self.heap_id, entry_loc)
    }

    fn find_min(&self) -> Result<&V, HeapError> {
        let root = self.root.ok_or(HeapError::Empty)?;
        Ok(&self.entries[self.nodes[root].entry].value)
    }

    fn decrease_key(&mut self, entry: &Entry, new_prio: P) -> Result<(), HeapError> {
        self.check_entry(entry)?;
        if new_prio > self.entries[entry.loc].prio {
            return Err(HeapError::KeyNotDecreased);
        }
        self.entries[entry.loc].prio = new_prio;
        let x = self.entries[entry.loc].node;

        if self.node_is_root(x) {
            return Ok(());
        }

        let root = self.root.expect("root exists while the heap is nonempty");
        if self.node_less(x, root) {
            self.swap_entries(root, x);
        }

        if self.node_is_violating(x) {
            let y = self.nodes[x].parent.expect("violating node has a parent");

            if self.node_is_active(x) && !self.node_is_active_root(x) {
                if self.nodes[x].loss > 0 {
                    if let Some(flr) = self.nodes[x].fix {
                        let rank = self.fix_records[flr].rank;
                        self.rm_fl_checked(flr, FixListKind::Loss, rank);
                        self.fix_records.remove(flr);
                        self.nodes[x].fix = None;
                    }
                    self.nodes[x].loss = 0;
                }
                self.remove_child(y, x);
                self.add_root_child(x);
                let rank = self.nodes[x].rank;
                self.add_to_fix_list(x, FixListKind::ActiveRoots, rank);
                self.decrease_rank(y);
            } else {
                self.remove_child(y, x);
                self.add_root_child(x);
            }

            if self.node_is_active(y) && !self.node_is_active_root(y) {
                self.increase_loss(y);
                self.do_loss_reduce();
            }

            let mut c1 = 0;
            while c1 < 6 && self.do_active_root_reduce() {
                c1 += 1;
            }
            let mut c2 = 0;
            while c2 < 4 && self.do_root_degree_reduce() {
                c2 += 1;
            }
        }
        Ok(())
    }

    fn delete_min(&mut self) -> Result<V, HeapError> {
        let old_root = self.root.ok_or(HeapError::Empty)?;

        if self.size > 1 {
            let x = self.find_new_root();
            self.make_passive(x);
            self.remove_root_child(x);
            self.move_old_children_to(x);
            self.remove_from_queue(x);

            for _ in 0..2 {
                let head = match self.queue_head {
                    Some(h) => h,
                    None => break,
                };
                let passive1 = self.disconnect_passive_child(head);
                let passive2 = self.disconnect_passive_child(head);
                if let Some(p) = passive1 {
                    self.add_root_child(p);
                }
                if let Some(p) = passive2 {
                    self.add_root_child(p);
                }
                self.queue_head = Some(self.nodes[head].qnext);
                self.do_loss_reduce();
            }

            while self.do_active_root_reduce() {}
            while self.do_root_degree_reduce() {}
        } else {
            self.root = None;
        }

        let removed = self.nodes.remove(old_root);
        let entry = self.entries.remove(removed.entry);
        self.size -= 1;
        Ok(entry.value)
    }

    fn meld(mut self, other: Self) -> Result<Self, HeapError> {
        if self.size == 0 {
            return Ok(other);
        }
        if other.size == 0 {
            return Ok(self);
        }

        let (mut x, y) = if self.size <= other.size { (self, other) } else { (other, self) };
        log::trace!("melding strict fibonacci heaps of size {} and {} in O(1)", x.size, y.size);

        // x is the smaller-or-equal heap: flip its shared active record to
        // false (every node still pointing at it becomes passive in O(1)),
        // and discard its own fix-lists and rank-list — they only ever
        // tracked active nodes, all of which just became passive.
        x.active_records[x.active_record] = false;
        x.non_linkable = None;

        let x_root = x.root.expect("non-empty heap has a root");
        let y_root = y.root.expect("non-empty heap has a root");
        let x_queue_head = x.queue_head;
        let x_size = x.size;

        let mut merged = y;
        merged.nodes.absorb(x.nodes);
        merged.entries.absorb(x.entries);
        merged.active_records.absorb(x.active_records);

        let (u_root, v_root) = if merged.node_less(y_root, x_root) {
            (y_root, x_root)
        } else {
            (x_root, y_root)
        };
        merged.root = Some(u_root);
        if u_root == x_root {
            merged.non_linkable = None;
        }
        merged.add_root_child(v_root);
        merged.size += x_size;

        let new_queue_head = merged.concat_queues(x_queue_head, merged.queue_head, v_root);
        merged.queue_head = Some(new_queue_head);

        while merged.do_active_root_reduce() {}
        while merged.do_root_degree_reduce() {}

        Ok(merged)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.entries.clear();
        self.active_records.clear();
        self.active_record = self.active_records.insert(true);
        self.fix_records.clear();
        self.ranks.clear();
        self.rank_list = self.ranks.insert(RankRecord { inc: None, dec: None, active_roots: None, loss: None });
        self.root = None;
        self.non_linkable = None;
        self.queue_head = None;
        self.fix_list_act_roots = None;
        self.fix_list_loss = None;
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all(mut h: StrictFibonacciHeap<i32, i32>) -> Vec<i32> {
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        out
    }

    #[test]
    fn s1_insert_then_drain() {
        let mut h = StrictFibonacciHeap::new();
        for v in [5, 3, 8, 1, 6, 2, 4] {
            h.insert(v, v);
        }
        assert_eq!(drain_all(h), vec![1, 2, 3, 4, 5, 6, 8]);
    }

    #[test]
    fn s2_decrease_key() {
        let mut h = StrictFibonacciHeap::new();
        let entries: Vec<_> = [10, 20, 30, 40, 50].into_iter().map(|p| h.insert(p, p)).collect();
        h.decrease_key(&entries[4], 5).unwrap();
        h.decrease_key(&entries[2], 15).unwrap();
        assert_eq!(drain_all(h), vec![5, 10, 15, 20, 40]);
    }

    #[test]
    fn s3_empty_errors() {
        let mut h: StrictFibonacciHeap<i32, i32> = StrictFibonacciHeap::new();
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
        h.insert(7, 7);
        assert_eq!(*h.find_min().unwrap(), 7);
        assert_eq!(h.delete_min().unwrap(), 7);
        assert_eq!(h.find_min().unwrap_err(), HeapError::Empty);
    }

    #[test]
    fn s4_meld() {
        let mut a = StrictFibonacciHeap::new();
        for v in [2, 9, 4] {
            a.insert(v, v);
        }
        let mut b = StrictFibonacciHeap::new();
        for v in [1, 7, 3] {
            b.insert(v, v);
        }
        let c = a.meld(b).unwrap();
        assert_eq!(drain_all(c), vec![1, 2, 3, 4, 7, 9]);
    }

    #[test]
    fn s6_bulk_decrease_then_drain() {
        let mut h = StrictFibonacciHeap::new();
        let entries: Vec<_> = (0..1024i32).map(|v| h.insert(v, v)).collect();
        for (i, e) in entries.iter().enumerate() {
            if i % 2 == 1 {
                h.decrease_key(e, -(i as i32)).unwrap();
            }
        }
        let out = drain_all(h);
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(out, sorted);
        assert_eq!(out.len(), 1024);
    }

    #[test]
    fn decrease_key_after_delete_min_keeps_heap_order() {
        let mut h = StrictFibonacciHeap::new();
        let e2 = h.insert(20, 2);
        let e3 = h.insert(30, 3);
        let e4 = h.insert(40, 4);
        let e1 = h.insert(10, 1);
        let _ = e1;
        assert_eq!(h.delete_min().unwrap(), 10);
        h.decrease_key(&e3, 0).unwrap();
        assert_eq!(*h.find_min().unwrap(), 30);
        let mut out = Vec::new();
        while !h.is_empty() {
            out.push(h.delete_min().unwrap());
        }
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(out, sorted);
        let _ = e2;
        let _ = e4;
    }

    #[test]
    fn repeated_decrease_keeps_heap_order() {
        let mut h = StrictFibonacciHeap::new();
        let entries: Vec<_> = (0..64i32).rev().map(|v| h.insert(v, v)).collect();
        for (i, e) in entries.iter().enumerate() {
            h.decrease_key(e, -(i as i32) - 100).unwrap();
        }
        let out = drain_all(h);
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(out, sorted);
    }

    #[test]
    fn wrong_heap_is_rejected() {
        let mut a = StrictFibonacciHeap::new();
        let e = a.insert(1, 1);
        let mut b: StrictFibonacciHeap<i32, i32> = StrictFibonacciHeap::new();
        b.insert(2, 2);
        assert_eq!(b.decrease_key(&e, 0).unwrap_err(), HeapError::WrongHeap);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut h = StrictFibonacciHeap::new();
        h.insert(1, 1);
        h.insert(2, 2);
        h.clear();
        assert!(h.is_empty());
        h.clear();
        assert!(h.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn drain_is_always_sorted(mut priorities in proptest::collection::vec(-1000i32..1000, 0..300)) {
            let mut h = StrictFibonacciHeap::new();
            for p in priorities.drain(..) {
                h.insert(p, p);
            }
            let mut out = Vec::new();
            while !h.is_empty() {
                out.push(h.delete_min().unwrap());
            }
            let mut sorted = out.clone();
            sorted.sort();
            proptest::prop_assert_eq!(out, sorted);
        }

        #[test]
        fn meld_then_drain_is_sorted(a in proptest::collection::vec(-500i32..500, 0..100), b in proptest::collection::vec(-500i32..500, 0..100)) {
            let mut ha = StrictFibonacciHeap::new();
            for p in &a {
                ha.insert(*p, *p);
            }
            let mut hb = StrictFibonacciHeap::new();
            for p in &b {
                hb.insert(*p, *p);
            }
            let mut h = ha.meld(hb).unwrap();
            let mut out = Vec::new();
            while !h.is_empty() {
                out.push(h.delete_min().unwrap());
            }
            let mut expected: Vec<i32> = a.into_iter().chain(b).collect();
            expected.sort();
            proptest::prop_assert_eq!(out, expected);
        }
    }
}
