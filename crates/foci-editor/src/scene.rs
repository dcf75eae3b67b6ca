//! Scene model: an append-only arena of circles and two-focus ellipses.
//!
//! Objects are addressed by [`ObjectId`], their index in the arena. Nothing is
//! ever removed, so an id stays valid for the life of the scene and an
//! ellipse's references to its focus circles cannot dangle.

use std::fmt;

use foci_engine::coords::Vec2;

/// Stable handle of a scene object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        // The arena would exhaust memory long before u32.
        Self(index as u32)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Strictly inside: a point on the rim is not a hit.
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance(p) < self.radius
    }
}

/// Region where the summed distance to two focus circles' centers is below
/// `radius`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipse {
    pub foci: [ObjectId; 2],
    pub radius: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Object {
    Circle(Circle),
    Ellipse(Ellipse),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    Circle,
    Ellipse,
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Circle(_) => ObjectKind::Circle,
            Object::Ellipse(_) => ObjectKind::Ellipse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The id is not in the scene.
    UnknownObject(ObjectId),
    /// An ellipse focus must be a circle.
    NotACircle(ObjectId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownObject(id) => write!(f, "object {id} does not exist"),
            SceneError::NotACircle(id) => write!(f, "object {id} is not a circle"),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<Object>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    /// Objects with their ids, in creation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId::from_index(i), o))
    }

    pub fn circles(&self) -> impl DoubleEndedIterator<Item = (ObjectId, &Circle)> {
        self.iter().filter_map(|(id, o)| match o {
            Object::Circle(c) => Some((id, c)),
            Object::Ellipse(_) => None,
        })
    }

    pub fn ellipses(&self) -> impl DoubleEndedIterator<Item = (ObjectId, &Ellipse)> {
        self.iter().filter_map(|(id, o)| match o {
            Object::Ellipse(e) => Some((id, e)),
            Object::Circle(_) => None,
        })
    }

    pub fn circle(&self, id: ObjectId) -> Option<&Circle> {
        match self.get(id)? {
            Object::Circle(c) => Some(c),
            Object::Ellipse(_) => None,
        }
    }

    pub fn circle_mut(&mut self, id: ObjectId) -> Option<&mut Circle> {
        match self.objects.get_mut(id.index())? {
            Object::Circle(c) => Some(c),
            Object::Ellipse(_) => None,
        }
    }

    pub fn ellipse(&self, id: ObjectId) -> Option<&Ellipse> {
        match self.get(id)? {
            Object::Ellipse(e) => Some(e),
            Object::Circle(_) => None,
        }
    }

    pub fn ellipse_mut(&mut self, id: ObjectId) -> Option<&mut Ellipse> {
        match self.objects.get_mut(id.index())? {
            Object::Ellipse(e) => Some(e),
            Object::Circle(_) => None,
        }
    }

    pub fn add_circle(&mut self, x: f32, y: f32, radius: f32) -> ObjectId {
        let id = self.push(Object::Circle(Circle { center: Vec2::new(x, y), radius }));
        log::info!("added circle {id} at ({x}, {y}), radius {radius}");
        id
    }

    /// Adds an ellipse whose foci are the centers of two existing circles.
    pub fn add_ellipse(&mut self, focus0: ObjectId, focus1: ObjectId, radius: f32) -> Result<ObjectId, SceneError> {
        for focus in [focus0, focus1] {
            match self.get(focus) {
                None => return Err(SceneError::UnknownObject(focus)),
                Some(Object::Ellipse(_)) => return Err(SceneError::NotACircle(focus)),
                Some(Object::Circle(_)) => {}
            }
        }

        let id = self.push(Object::Ellipse(Ellipse { foci: [focus0, focus1], radius }));
        log::info!("added ellipse {id} with foci {focus0} and {focus1}, radius {radius}");
        Ok(id)
    }

    /// Current focus points of an ellipse.
    pub fn focus_points(&self, ellipse: &Ellipse) -> [Vec2; 2] {
        ellipse.foci.map(|id| self.focus_center(id))
    }

    fn focus_center(&self, id: ObjectId) -> Vec2 {
        match &self.objects[id.index()] {
            Object::Circle(c) => c.center,
            // Foci are validated on insertion and objects never change kind.
            Object::Ellipse(_) => unreachable!("ellipse focus {id} is not a circle"),
        }
    }

    /// Point-in-shape test against one object, in world coordinates.
    ///
    /// Panics on an id that is not in the scene.
    pub fn hit_test(&self, id: ObjectId, p: Vec2) -> bool {
        match &self.objects[id.index()] {
            Object::Circle(c) => c.contains(p),
            Object::Ellipse(e) => {
                let [f0, f1] = self.focus_points(e);
                f0.distance(p) + f1.distance(p) < e.radius
            }
        }
    }

    /// First object in index order containing `p`.
    pub fn pick(&self, p: Vec2) -> Option<ObjectId> {
        (0..self.objects.len())
            .map(ObjectId::from_index)
            .find(|&id| self.hit_test(id, p))
    }

    /// The two most recently created circles, older first.
    pub fn last_two_circles(&self) -> Option<[ObjectId; 2]> {
        let mut recent = self.circles().rev().map(|(id, _)| id);
        let newest = recent.next()?;
        let previous = recent.next()?;
        Some([previous, newest])
    }

    fn push(&mut self, object: Object) -> ObjectId {
        let id = ObjectId::from_index(self.objects.len());
        self.objects.push(object);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_foci() -> (Scene, ObjectId, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let c0 = scene.add_circle(0.3, 0.2, 0.05);
        let c1 = scene.add_circle(0.7, 0.5, 0.05);
        let e = scene.add_ellipse(c0, c1, 1.0).unwrap();
        (scene, c0, c1, e)
    }

    // ── arena ─────────────────────────────────────────────────────────────

    #[test]
    fn ids_follow_insertion_order() {
        let (scene, c0, c1, e) = two_foci();
        assert_eq!((c0.index(), c1.index(), e.index()), (0, 1, 2));
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.get(e).map(Object::kind), Some(ObjectKind::Ellipse));
    }

    #[test]
    fn ellipse_foci_must_be_existing_circles() {
        let (mut scene, c0, _, e) = two_foci();
        assert_eq!(scene.add_ellipse(c0, e, 1.0), Err(SceneError::NotACircle(e)));
        let missing = ObjectId::from_index(42);
        assert_eq!(scene.add_ellipse(missing, c0, 1.0), Err(SceneError::UnknownObject(missing)));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn typed_accessors_respect_kind() {
        let (mut scene, c0, _, e) = two_foci();
        assert!(scene.circle(c0).is_some());
        assert!(scene.circle(e).is_none());
        assert!(scene.ellipse_mut(c0).is_none());
        scene.ellipse_mut(e).unwrap().radius = 2.0;
        assert_eq!(scene.ellipse(e).unwrap().radius, 2.0);
    }

    // ── hit testing ───────────────────────────────────────────────────────

    #[test]
    fn circle_hit_is_strict() {
        let mut scene = Scene::new();
        let c = scene.add_circle(0.0, 0.0, 0.5);
        assert!(scene.hit_test(c, Vec2::new(0.3, 0.3)));
        assert!(!scene.hit_test(c, Vec2::new(0.5, 0.0)), "rim is not a hit");
        assert!(!scene.hit_test(c, Vec2::new(0.4, 0.4)));
    }

    #[test]
    fn ellipse_midpoint_is_inside() {
        let (scene, _, _, e) = two_foci();
        assert!(scene.hit_test(e, Vec2::new(0.5, 0.35)));
    }

    #[test]
    fn ellipse_hit_uses_summed_focal_distance() {
        let mut scene = Scene::new();
        let a = scene.add_circle(-1.0, 0.0, 0.1);
        let b = scene.add_circle(1.0, 0.0, 0.1);
        let e = scene.add_ellipse(a, b, 4.0).unwrap();
        // Vertex of the major axis lies exactly on the boundary.
        assert!(!scene.hit_test(e, Vec2::new(2.0, 0.0)));
        assert!(scene.hit_test(e, Vec2::new(1.99, 0.0)));
        assert!(!scene.hit_test(e, Vec2::new(0.0, 1.8)));
    }

    #[test]
    fn ellipse_follows_moved_focus() {
        let (mut scene, c0, _, e) = two_foci();
        let far = Vec2::new(3.0, 3.0);
        assert!(!scene.hit_test(e, far));
        scene.circle_mut(c0).unwrap().center = Vec2::new(2.9, 2.9);
        scene.ellipse_mut(e).unwrap().radius = 5.0;
        assert!(scene.hit_test(e, far));
    }

    #[test]
    fn pick_prefers_lowest_index() {
        let (scene, c0, _, e) = two_foci();
        // Inside both the first circle and the ellipse.
        assert_eq!(scene.pick(Vec2::new(0.3, 0.2)), Some(c0));
        assert_eq!(scene.pick(Vec2::new(0.5, 0.35)), Some(e));
        assert_eq!(scene.pick(Vec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn last_two_circles_skips_ellipses() {
        let (mut scene, _, c1, _) = two_foci();
        assert_eq!(scene.last_two_circles().map(|[a, b]| (a.index(), b.index())), Some((0, 1)));
        let c2 = scene.add_circle(0.1, 0.1, 0.02);
        assert_eq!(scene.last_two_circles(), Some([c1, c2]));
        assert_eq!(Scene::new().last_two_circles(), None);
    }
}
