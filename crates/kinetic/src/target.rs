use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use tracing::warn;

use crate::math::{Color3, Vec2, Vec3};

/// Handle passed to `Action::start_with_target`. Actions only keep a weak
/// reference to it, so dropping the last strong handle turns every bound
/// action into a no-op.
pub type SharedTarget = Rc<RefCell<dyn Target>>;
pub(crate) type WeakTarget = Weak<RefCell<dyn Target>>;

/// Properties the leaf actions read and write.
///
/// Rotation is in degrees per axis; 2D actions only touch `z`. Skew is in
/// degrees for the x and y axes.
pub trait Target {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Vec3;
    fn set_rotation(&mut self, rotation: Vec3);
    fn scale(&self) -> Vec3;
    fn set_scale(&mut self, scale: Vec3);
    fn skew(&self) -> Vec2;
    fn set_skew(&mut self, skew: Vec2);
    fn opacity(&self) -> u8;
    fn set_opacity(&mut self, opacity: u8);
    fn color(&self) -> Color3;
    fn set_color(&mut self, color: Color3);
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub skew: Vec2,
    pub opacity: u8,
    pub color: Color3,
    pub visible: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            skew: Vec2::ZERO,
            opacity: u8::MAX,
            color: Color3::WHITE,
            visible: true,
        }
    }
}

impl Node {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position.extend(self.position.z);
        self
    }

    pub fn into_shared(self) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(self))
    }
}

impl Target for Node {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn skew(&self) -> Vec2 {
        self.skew
    }

    fn set_skew(&mut self, skew: Vec2) {
        self.skew = skew;
    }

    fn opacity(&self) -> u8 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }

    fn color(&self) -> Color3 {
        self.color
    }

    fn set_color(&mut self, color: Color3) {
        self.color = color;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Runs `apply` against the bound target if it is still alive and not
/// already borrowed elsewhere.
pub(crate) fn with_target<R>(
    target: Option<&WeakTarget>,
    apply: impl FnOnce(&mut dyn Target) -> R,
) -> Option<R> {
    let shared = target?.upgrade()?;
    let mut guard = match shared.try_borrow_mut() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("target_busy; skipping action update");
            return None;
        }
    };
    Some(apply(&mut *guard))
}
