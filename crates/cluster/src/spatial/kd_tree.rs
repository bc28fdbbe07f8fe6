use foundation::bounds::Aabb2;
use foundation::math::Vec2;
use foundation::math::precision::stable_total_cmp_f64;

/// A static 2D kd-tree over points in normalized world coordinates.
///
/// The tree is stored flat: items are reordered in place so that every
/// `[left, right]` range splits at its median `(left + right) / 2`, alternating
/// x and y. Ranges of at most `node_size` items are scanned linearly.
///
/// Ordering contract:
/// - `range` and `within` return item ids in ascending order.
#[derive(Debug, Clone)]
pub struct KdTree {
    node_size: usize,
    ids: Vec<usize>,
    coords: Vec<Vec2>,
}

impl KdTree {
    /// Build over `points`; item ids are their positions in the input.
    pub fn build(points: &[Vec2], node_size: usize) -> Self {
        let node_size = node_size.max(1);
        let mut items: Vec<(usize, Vec2)> = points.iter().copied().enumerate().collect();
        if !items.is_empty() {
            let right = items.len() - 1;
            sort_kd(&mut items, node_size, 0, right, 0);
        }
        let (ids, coords) = items.into_iter().unzip();
        Self {
            node_size,
            ids,
            coords,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids of items inside `query` (inclusive edges).
    pub fn range(&self, query: &Aabb2) -> Vec<usize> {
        let mut hits = Vec::new();
        if self.ids.is_empty() {
            return hits;
        }

        let mut stack: Vec<(usize, usize, usize)> = vec![(0, self.ids.len() - 1, 0)];
        while let Some((left, right, axis)) = stack.pop() {
            if right - left <= self.node_size {
                for i in left..=right {
                    let p = self.coords[i];
                    if query.contains([p.x, p.y]) {
                        hits.push(self.ids[i]);
                    }
                }
                continue;
            }

            let m = (left + right) / 2;
            let p = self.coords[m];
            if query.contains([p.x, p.y]) {
                hits.push(self.ids[m]);
            }

            let v = axis_value(p, axis);
            if query.min[axis] <= v {
                stack.push((left, m - 1, 1 - axis));
            }
            if query.max[axis] >= v {
                stack.push((m + 1, right, 1 - axis));
            }
        }

        hits.sort_unstable();
        hits
    }

    /// Ids of items within Euclidean distance `r` of `center`.
    pub fn within(&self, center: Vec2, r: f64) -> Vec<usize> {
        let mut hits = Vec::new();
        self.within_into(center, r, &mut hits);
        hits.sort_unstable();
        hits
    }

    /// Like [`KdTree::within`], but distances along x wrap around the unit
    /// interval, so items on either side of the antimeridian are neighbors.
    pub fn within_cyclic_x(&self, center: Vec2, r: f64) -> Vec<usize> {
        let mut hits = Vec::new();
        self.within_into(center, r, &mut hits);
        if center.x - r < 0.0 {
            self.within_into(Vec2::new(center.x + 1.0, center.y), r, &mut hits);
        }
        if center.x + r > 1.0 {
            self.within_into(Vec2::new(center.x - 1.0, center.y), r, &mut hits);
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    fn within_into(&self, center: Vec2, r: f64, hits: &mut Vec<usize>) {
        if self.ids.is_empty() {
            return;
        }
        let r2 = r * r;

        let mut stack: Vec<(usize, usize, usize)> = vec![(0, self.ids.len() - 1, 0)];
        while let Some((left, right, axis)) = stack.pop() {
            if right - left <= self.node_size {
                for i in left..=right {
                    if self.coords[i].dist_sq(center) <= r2 {
                        hits.push(self.ids[i]);
                    }
                }
                continue;
            }

            let m = (left + right) / 2;
            let p = self.coords[m];
            if p.dist_sq(center) <= r2 {
                hits.push(self.ids[m]);
            }

            let v = axis_value(p, axis);
            let c = axis_value(center, axis);
            if c - r <= v {
                stack.push((left, m - 1, 1 - axis));
            }
            if c + r >= v {
                stack.push((m + 1, right, 1 - axis));
            }
        }
    }
}

fn axis_value(p: Vec2, axis: usize) -> f64 {
    if axis == 0 { p.x } else { p.y }
}

fn sort_kd(items: &mut [(usize, Vec2)], node_size: usize, left: usize, right: usize, axis: usize) {
    if right - left <= node_size {
        return;
    }

    let m = (left + right) / 2;
    // Deterministic tie-break on id so equal coordinates always land the same way.
    items[left..=right].select_nth_unstable_by(m - left, |a, b| {
        stable_total_cmp_f64(axis_value(a.1, axis), axis_value(b.1, axis)).then_with(|| a.0.cmp(&b.0))
    });

    sort_kd(items, node_size, left, m - 1, 1 - axis);
    sort_kd(items, node_size, m + 1, right, 1 - axis);
}
