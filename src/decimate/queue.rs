/*!
Indexed binary min-heap. The position of every element inside the heap is
tracked, so the cost of an element already in the queue can be changed in
logarithmic time by sifting it up or down from where it is.
*/

use crate::element::Handle;
use std::cmp::Ordering;

/// Priority queue of mesh elements, popping the lowest cost first. Each
/// handle is present at most once.
pub(crate) struct Queue<H, Cost>
where
    H: Handle,
    Cost: PartialOrd + Copy,
{
    items: Vec<(H, Cost)>,
    positions: Vec<Option<usize>>,
}

const fn parent(index: usize) -> Option<usize> {
    match index {
        0 => None,
        i => Some((i - 1) / 2),
    }
}

impl<H, Cost> Queue<H, Cost>
where
    H: Handle,
    Cost: PartialOrd + Copy,
{
    /// Create a queue, reserving room for handles with indices below
    /// `capacity`. Larger handles grow the position map as needed.
    pub fn new(capacity: usize) -> Self {
        Queue {
            items: Vec::with_capacity(capacity),
            positions: vec![None; capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, val: H) -> Option<usize> {
        self.positions.get(val.index() as usize).copied().flatten()
    }

    fn set_position(&mut self, val: H, pos: Option<usize>) {
        let i = val.index() as usize;
        if i >= self.positions.len() {
            self.positions.resize(i + 1, None);
        }
        self.positions[i] = pos;
    }

    fn less(&self, i: usize, j: usize) -> bool {
        matches!(
            self.items[i].1.partial_cmp(&self.items[j].1),
            Some(Ordering::Less)
        )
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.items.swap(i, j);
        self.set_position(self.items[i].0, Some(i));
        self.set_position(self.items[j].0, Some(j));
    }

    fn sift_up(&mut self, mut index: usize) {
        while let Some(pi) = parent(index) {
            if !self.less(index, pi) {
                break;
            }
            self.swap(index, pi);
            index = pi;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let (left, right) = (2 * index + 1, 2 * index + 2);
            let mut smallest = index;
            if left < self.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }

    /// Take the item at `index` out of the heap and restore the heap order.
    fn take(&mut self, index: usize) -> (H, Cost) {
        let item = self.items.swap_remove(index);
        self.set_position(item.0, None);
        if index < self.len() {
            self.set_position(self.items[index].0, Some(index));
            self.sift_down(index);
            self.sift_up(index);
        }
        item
    }

    /// Insert `val` with `cost`. If `val` is already queued, its cost is
    /// replaced.
    pub fn insert(&mut self, val: H, cost: Cost) {
        match self.position(val) {
            Some(index) => {
                self.items[index].1 = cost;
                self.sift_down(index);
                self.sift_up(index);
            }
            None => {
                self.set_position(val, Some(self.len()));
                self.items.push((val, cost));
                self.sift_up(self.len() - 1);
            }
        }
    }

    /// Remove `val` if it is queued.
    pub fn remove(&mut self, val: H) -> Option<Cost> {
        self.position(val).map(|index| self.take(index).1)
    }

    /// Remove and return the item with the lowest cost.
    pub fn pop(&mut self) -> Option<(H, Cost)> {
        if self.is_empty() {
            None
        } else {
            Some(self.take(0))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Queue, parent};
    use crate::element::{HH, Handle};

    fn drain(mut queue: Queue<HH, f64>) -> Vec<u32> {
        let mut out = Vec::with_capacity(queue.len());
        while let Some((h, _)) = queue.pop() {
            out.push(h.index());
        }
        out
    }

    fn is_heap(queue: &Queue<HH, f64>) -> bool {
        (0..queue.len()).all(|i| {
            parent(i).is_none_or(|pi| queue.items[pi].1 <= queue.items[i].1)
                && queue.position(queue.items[i].0) == Some(i)
        })
    }

    #[test]
    fn t_queue_sorted_output() {
        let mut queue = Queue::new(10);
        for i in [8u32, 1, 5, 3, 9, 2, 6, 4, 0, 7] {
            queue.insert(HH::from(i), i as f64);
            assert!(is_heap(&queue));
        }
        assert_eq!(queue.len(), 10);
        assert_eq!(drain(queue), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn t_queue_remove() {
        let mut queue = Queue::new(10);
        for i in [4u32, 3, 5, 8, 2, 9, 1, 7, 0, 6] {
            queue.insert(HH::from(i), i as f64);
        }
        assert_eq!(queue.remove(3.into()), Some(3.0));
        assert_eq!(queue.remove(6.into()), Some(6.0));
        assert_eq!(queue.remove(6.into()), None);
        assert!(is_heap(&queue));
        assert_eq!(queue.remove(3.into()), None);
        assert_eq!(drain(queue), vec![0, 1, 2, 4, 5, 7, 8, 9]);
    }

    #[test]
    fn t_queue_update() {
        let mut queue = Queue::new(10);
        for i in [4u32, 3, 5, 8, 2, 9, 1, 7, 0, 6] {
            queue.insert(HH::from(i), i as f64);
        }
        queue.insert(4.into(), -1.0);
        queue.insert(2.into(), 13.0);
        assert_eq!(queue.len(), 10);
        assert!(is_heap(&queue));
        assert_eq!(drain(queue), vec![4, 0, 1, 3, 5, 6, 7, 8, 9, 2]);
    }

    #[test]
    fn t_queue_empty() {
        let mut queue: Queue<HH, f64> = Queue::new(0);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.remove(0.into()), None);
        queue.insert(5.into(), 10.0);
        assert_eq!(queue.pop(), Some((5.into(), 10.0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn t_queue_sparse_handles() {
        let mut queue = Queue::new(2);
        queue.insert(HH::from(100), 3.0);
        queue.insert(HH::from(50), 1.0);
        queue.insert(HH::from(2000), 2.0);
        assert_eq!(drain(queue), vec![50, 2000, 100]);
    }

    #[test]
    fn t_queue_random_operations() {
        let mut rng = fastrand::Rng::with_seed(42);
        let mut queue = Queue::new(64);
        let mut expected = std::collections::HashMap::new();
        for _ in 0..500 {
            let h = HH::from(rng.u32(0..64));
            if rng.bool() {
                let cost = rng.f64();
                queue.insert(h, cost);
                expected.insert(h, cost);
            } else {
                assert_eq!(queue.remove(h), expected.remove(&h));
            }
            assert!(is_heap(&queue));
        }
        assert_eq!(queue.len(), expected.len());
        let mut last = f64::NEG_INFINITY;
        while let Some((h, cost)) = queue.pop() {
            assert_eq!(expected.remove(&h), Some(cost));
            assert!(cost >= last);
            last = cost;
        }
        assert!(expected.is_empty());
    }
}
