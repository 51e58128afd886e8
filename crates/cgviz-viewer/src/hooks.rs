//! Startup and per-frame hooks.
//!
//! Initializers run once, in registration order, before the first frame.
//! Animators run on every frame with the frame time in seconds.

use cgviz_core::VizError;
use indexmap::IndexMap;

/// A startup step.
pub type Initializer<C> = Box<dyn FnMut(&mut C) -> Result<(), VizError>>;

/// A per-frame step.
pub type Animator<C> = Box<dyn FnMut(&mut C, f64)>;

/// Named initializers and animators over a context `C`.
pub struct FrameHooks<C> {
    initializers: IndexMap<String, Initializer<C>>,
    animators: IndexMap<String, Animator<C>>,
    initialized: bool,
}

impl<C> Default for FrameHooks<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for FrameHooks<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHooks")
            .field("initializers", &self.initializers.keys().collect::<Vec<_>>())
            .field("animators", &self.animators.keys().collect::<Vec<_>>())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<C> FrameHooks<C> {
    pub fn new() -> Self {
        Self {
            initializers: IndexMap::new(),
            animators: IndexMap::new(),
            initialized: false,
        }
    }

    /// Register an initializer, replacing one of the same name in place.
    pub fn register_initializer<F>(&mut self, name: impl Into<String>, init: F)
    where
        F: FnMut(&mut C) -> Result<(), VizError> + 'static,
    {
        self.initializers.insert(name.into(), Box::new(init));
    }

    /// Register an animator, replacing one of the same name in place.
    pub fn register_animator<F>(&mut self, name: impl Into<String>, animate: F)
    where
        F: FnMut(&mut C, f64) + 'static,
    {
        self.animators.insert(name.into(), Box::new(animate));
    }

    pub fn remove_animator(&mut self, name: &str) -> bool {
        self.animators.shift_remove(name).is_some()
    }

    pub fn initializer_names(&self) -> impl Iterator<Item = &str> {
        self.initializers.keys().map(String::as_str)
    }

    pub fn animator_names(&self) -> impl Iterator<Item = &str> {
        self.animators.keys().map(String::as_str)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run every initializer once.
    ///
    /// Stops at the first failure; the next call retries from the start.
    pub fn run_initializers(&mut self, context: &mut C) -> Result<(), VizError> {
        if self.initialized {
            return Ok(());
        }
        for (name, init) in &mut self.initializers {
            log::debug!("Running initializer {}", name);
            init(context)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Run every animator for one frame.
    pub fn animate(&mut self, context: &mut C, time: f64) {
        for animate in self.animators.values_mut() {
            animate(context, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgviz_core::SceneError;

    #[test]
    fn test_initializers_run_once_in_order() {
        let mut hooks: FrameHooks<Vec<&'static str>> = FrameHooks::new();
        hooks.register_initializer("scene", |log| {
            log.push("scene");
            Ok(())
        });
        hooks.register_initializer("lights", |log| {
            log.push("lights");
            Ok(())
        });

        let mut log = Vec::new();
        hooks.run_initializers(&mut log).unwrap();
        hooks.run_initializers(&mut log).unwrap();
        assert_eq!(log, ["scene", "lights"]);
        assert!(hooks.is_initialized());
    }

    #[test]
    fn test_failed_initializer() {
        let mut hooks: FrameHooks<u32> = FrameHooks::new();
        hooks.register_initializer("bad", |_| {
            Err(SceneError::Renderer { reason: "no context".into() }.into())
        });
        let mut calls = 0;
        assert!(hooks.run_initializers(&mut calls).is_err());
        assert!(!hooks.is_initialized());
    }

    #[test]
    fn test_animate() {
        let mut hooks: FrameHooks<f64> = FrameHooks::new();
        hooks.register_animator("clock", |t, time| *t += time);
        hooks.register_animator("clock", |t, time| *t = time);
        assert_eq!(hooks.animator_names().count(), 1);

        let mut t = 0.0;
        hooks.animate(&mut t, 1.5);
        hooks.animate(&mut t, 2.0);
        assert_eq!(t, 2.0);

        assert!(hooks.remove_animator("clock"));
        hooks.animate(&mut t, 9.0);
        assert_eq!(t, 2.0);
    }
}
