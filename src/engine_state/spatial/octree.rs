//! # Octree
//!
//! A generic bounding-volume octree. Objects are stored with their bounds at the
//! deepest node whose single octant contains them; objects that straddle octant
//! boundaries stay at the node where they stop fitting.
//!
//! Leaves split lazily: a leaf holding more than `max_objects_per_node` objects
//! subdivides into eight equal children and pushes down every object that fits one
//! of them, unless it is already at `max_depth`.
//!
//! Identity is value equality: [`Octree::remove`] removes the first stored object
//! equal to the one given.
//!
//! The tree has no interior locking. Mutation needs exclusive access, which the
//! borrow checker enforces through `&mut self`.

use std::cmp::Ordering;

use cgmath::{Point3, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Subdivision limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Depth below which nodes never subdivide. The root is depth 0.
    pub max_depth: u32,
    /// Objects a leaf may hold before it subdivides.
    pub max_objects_per_node: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        OctreeConfig {
            max_depth: 6,
            max_objects_per_node: 8,
        }
    }
}

struct OctreeNode<T> {
    bounds: Aabb,
    depth: u32,
    objects: Vec<(Aabb, T)>,
    children: Option<Box<[OctreeNode<T>; 8]>>,
}

impl<T: PartialEq> OctreeNode<T> {
    fn new(bounds: Aabb, depth: u32) -> Self {
        OctreeNode {
            bounds,
            depth,
            objects: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, bounds: Aabb, object: T, config: &OctreeConfig) {
        if let Some(children) = self.children.as_mut() {
            match self.bounds.child_octant(&bounds) {
                Some(index) => children[index].insert(bounds, object, config),
                None => self.objects.push((bounds, object)),
            }
            return;
        }

        self.objects.push((bounds, object));
        if self.objects.len() > config.max_objects_per_node && self.depth < config.max_depth {
            self.subdivide(config);
        }
    }

    fn subdivide(&mut self, config: &OctreeConfig) {
        let (bounds, depth) = (self.bounds, self.depth + 1);
        self.children = Some(Box::new(std::array::from_fn(|index| {
            OctreeNode::new(bounds.octant(index), depth)
        })));
        for (bounds, object) in std::mem::take(&mut self.objects) {
            self.insert(bounds, object, config);
        }
    }

    fn remove(&mut self, bounds: &Aabb, object: &T) -> bool {
        let removed = if let Some(index) = self.objects.iter().position(|(_, stored)| stored == object) {
            self.objects.remove(index);
            true
        } else if let Some(children) = self.children.as_mut() {
            children
                .iter_mut()
                .filter(|child| child.bounds.intersects(bounds))
                .any(|child| child.remove(bounds, object))
        } else {
            false
        };
        if removed {
            self.collapse_empty_children();
        }
        removed
    }

    /// Drops the children once none of them holds anything.
    fn collapse_empty_children(&mut self) {
        let empty = self.children.as_ref().is_some_and(|children| {
            children
                .iter()
                .all(|child| child.children.is_none() && child.objects.is_empty())
        });
        if empty {
            self.children = None;
        }
    }

    fn query_region<'a>(&'a self, region: &Aabb, found: &mut Vec<&'a T>) {
        if !self.bounds.intersects(region) {
            return;
        }
        found.extend(
            self.objects
                .iter()
                .filter(|(bounds, _)| bounds.intersects(region))
                .map(|(_, object)| object),
        );
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_region(region, found);
            }
        }
    }

    fn query_ray<'a>(
        &'a self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        found: &mut Vec<(f32, &'a T)>,
    ) {
        for (bounds, object) in &self.objects {
            if let Some(t) = bounds.intersect_ray(origin, direction, max_distance) {
                found.push((t, object));
            }
        }
        let Some(children) = self.children.as_ref() else {
            return;
        };
        let mut hits: Vec<(f32, &OctreeNode<T>)> = children
            .iter()
            .filter_map(|child| {
                child
                    .bounds
                    .intersect_ray(origin, direction, max_distance)
                    .map(|t| (t, child))
            })
            .collect();
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        for (_, child) in hits {
            child.query_ray(origin, direction, max_distance, found);
        }
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map(|children| children.iter().map(OctreeNode::node_count).sum::<usize>())
            .unwrap_or(0)
    }

    fn max_depth_reached(&self) -> u32 {
        self.children
            .as_ref()
            .map(|children| children.iter().map(OctreeNode::max_depth_reached).max().unwrap_or(self.depth))
            .unwrap_or(self.depth)
    }

    fn for_each_stored<'a>(&'a self, visit: &mut dyn FnMut(&'a OctreeNode<T>, &'a Aabb)) {
        for (bounds, _) in &self.objects {
            visit(self, bounds);
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.for_each_stored(visit);
            }
        }
    }
}

/// A spatial index over objects with axis-aligned bounds.
pub struct Octree<T> {
    root: OctreeNode<T>,
    config: OctreeConfig,
    len: usize,
}

impl<T: PartialEq> Octree<T> {
    /// Creates an empty tree covering `bounds`. The tree never grows, so the bounds
    /// must cover everything that will be inserted.
    pub fn new(bounds: Aabb, config: OctreeConfig) -> Self {
        Octree {
            root: OctreeNode::new(bounds, 0),
            config,
            len: 0,
        }
    }

    /// The root bounds.
    pub fn bounds(&self) -> &Aabb {
        &self.root.bounds
    }

    /// The subdivision limits.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> u32 {
        self.root.max_depth_reached()
    }

    /// Inserts an object.
    ///
    /// # Returns
    /// `false` if `bounds` is not inside the root bounds. The object is dropped and a
    /// warning logged.
    pub fn insert(&mut self, bounds: Aabb, object: T) -> bool {
        if !self.root.bounds.contains(&bounds) {
            warn!(
                "Octree insert outside root bounds {:?}: {:?}",
                self.root.bounds, bounds
            );
            return false;
        }
        self.root.insert(bounds, object, &self.config);
        self.len += 1;
        true
    }

    /// Removes the first stored object equal to `object`, searching the nodes that
    /// intersect `bounds`.
    ///
    /// # Returns
    /// `true` if an object was removed.
    pub fn remove(&mut self, bounds: &Aabb, object: &T) -> bool {
        let removed = self.root.remove(bounds, object);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Moves an object to new bounds: remove, then insert.
    ///
    /// # Returns
    /// `true` if the object is stored under `new_bounds` afterwards.
    pub fn update(&mut self, old_bounds: &Aabb, new_bounds: Aabb, object: T) -> bool {
        if !self.remove(old_bounds, &object) {
            debug!("Octree update of an object not found under {:?}", old_bounds);
        }
        self.insert(new_bounds, object)
    }

    /// Removes everything, keeping the root bounds and config.
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
        self.len = 0;
    }

    /// Every object whose bounds intersect `region`.
    pub fn query_region(&self, region: &Aabb) -> Vec<&T> {
        let mut found = Vec::new();
        self.root.query_region(region, &mut found);
        found
    }

    /// Every object whose bounds the ray enters within `max_distance`, in traversal
    /// order. Children are visited nearest first, so results are roughly ordered by
    /// distance, but objects stored high in the tree come before deeper ones.
    pub fn query_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Vec<&T> {
        self.query_ray_with_distance(origin, direction, max_distance)
            .into_iter()
            .map(|(_, object)| object)
            .collect()
    }

    /// Like [`Octree::query_ray`], with each object's entry distance, sorted nearest
    /// first.
    pub fn query_ray_with_distance(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Vec<(f32, &T)> {
        let mut found = Vec::new();
        if self
            .root
            .bounds
            .intersect_ray(origin, direction, max_distance)
            .is_some()
        {
            self.root.query_ray(origin, direction, max_distance, &mut found);
        }
        found.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        found
    }

    /// True if every stored object lies inside the node holding it.
    pub fn is_consistent(&self) -> bool {
        let mut consistent = true;
        self.root
            .for_each_stored(&mut |node, bounds| consistent &= node.bounds.contains(bounds));
        consistent
    }
}
