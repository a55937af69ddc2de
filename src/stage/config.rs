use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use crate::{
    animation::timeline::TimelineSpec,
    foundation::core::{Rect, ViewportMode},
    foundation::error::{MotionError, MotionResult},
    motion::burst::BurstConfig,
    motion::carousel::CarouselScheduler,
    motion::marquee::MarqueeLoop,
    scope::scope::ScopeBuilder,
    scroll::trigger::ScrollBinding,
    stage::orchestrator::{BurstId, CarouselId, MarqueeId, MarqueeSpeeds, Orchestrator, ScopeHandle},
    target::tree::{RenderTree, SceneTree, VisualTarget},
    viewport::mode::ViewportConfig,
};

/// One element of a stand-alone scene: `rect` is `[x, y, width, height]` in document space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneElementDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    pub rect: [f64; 4],
}

/// A timeline entry of a scope.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineDef {
    pub target: VisualTarget,
    #[serde(flatten)]
    pub spec: TimelineSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollBinding>,
    /// Register only while the viewport is in this mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<ViewportMode>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScopeDef {
    pub root: VisualTarget,
    #[serde(default)]
    pub timelines: Vec<TimelineDef>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarqueeDef {
    pub target: VisualTarget,
    /// Full content width including the duplicate; measured from the target when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_width: Option<f64>,
    #[serde(flatten)]
    pub speeds: MarqueeSpeeds,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CarouselDef {
    pub name: String,
    pub items: Vec<String>,
    pub interval_secs: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BurstDef {
    pub name: String,
    #[serde(flatten)]
    pub config: BurstConfig,
}

/// Complete description of a stage.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Seed for random keyframe ranges.
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scene: Vec<SceneElementDef>,
    #[serde(default)]
    pub scopes: Vec<ScopeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marquees: Vec<MarqueeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub carousels: Vec<CarouselDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bursts: Vec<BurstDef>,
}

impl StageConfig {
    /// Parse a stage from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        serde_json::from_reader(r).map_err(|e| MotionError::serde(format!("parse stage JSON: {e}")))
    }

    /// Parse a stage from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MotionError::config(format!("open stage JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every nested option with the same rules the runtime constructors apply.
    pub fn validate(&self) -> MotionResult<()> {
        self.viewport.validate()?;
        for el in &self.scene {
            if el.rect.iter().any(|v| !v.is_finite()) || el.rect[2] < 0.0 || el.rect[3] < 0.0 {
                return Err(MotionError::config(format!(
                    "scene element '{}' has an invalid rect {:?}",
                    el.name, el.rect
                )));
            }
        }
        for (i, scope) in self.scopes.iter().enumerate() {
            for def in &scope.timelines {
                def.spec
                    .validate()
                    .and_then(|()| def.scroll.as_ref().map_or(Ok(()), ScrollBinding::validate))
                    .map_err(|e| MotionError::config(format!("scope {i}: {e}")))?;
            }
        }
        for m in &self.marquees {
            MarqueeLoop::new(m.content_width.unwrap_or(1.0), m.speeds.speed)?;
            if let Some(s) = m.speeds.compact_speed {
                MarqueeLoop::new(1.0, s)?;
            }
        }
        for c in &self.carousels {
            CarouselScheduler::start(c.items.clone(), c.interval_secs)
                .map_err(|e| MotionError::config(format!("carousel '{}': {e}", c.name)))?;
        }
        for b in &self.bursts {
            b.config
                .validate()
                .map_err(|e| MotionError::config(format!("burst '{}': {e}", b.name)))?;
        }
        Ok(())
    }

    /// Build the in-memory scene described by `scene`.
    pub fn scene_tree(&self) -> SceneTree {
        let mut tree = SceneTree::new();
        for el in &self.scene {
            let [x, y, w, h] = el.rect;
            let classes: Vec<&str> = el.classes.iter().map(String::as_str).collect();
            tree.insert(el.name.clone(), &classes, Rect::new(x, y, x + w, y + h));
        }
        tree
    }
}

/// Ids of everything [`Orchestrator::from_config`] created.
#[derive(Clone, Debug, Default)]
pub struct StageHandles {
    pub scopes: Vec<ScopeHandle>,
    pub marquees: Vec<MarqueeId>,
    pub carousels: BTreeMap<String, CarouselId>,
    pub bursts: BTreeMap<String, BurstId>,
}

fn register_defs(b: &mut ScopeBuilder<'_>, defs: &[TimelineDef]) -> MotionResult<()> {
    let mode = b.mode();
    for def in defs.iter().filter(|d| d.only.is_none_or(|m| m == mode)) {
        match &def.scroll {
            Some(binding) => b.scroll_timeline(def.target.clone(), def.spec.clone(), binding.clone())?,
            None => b.timeline(def.target.clone(), def.spec.clone())?,
        };
    }
    Ok(())
}

impl Orchestrator {
    /// Validate `config` and build every scope, marquee, carousel and burst it declares.
    #[tracing::instrument(skip(config, tree))]
    pub fn from_config<R: RenderTree>(
        config: &StageConfig,
        initial_width: f64,
        viewport_height: f64,
        tree: &R,
    ) -> MotionResult<(Self, StageHandles)> {
        config.validate()?;
        let mut stage = Self::new(config.viewport, initial_width, viewport_height, config.seed)?;
        let mut handles = StageHandles::default();

        for scope in &config.scopes {
            let defs = scope.timelines.clone();
            let handle = stage.open_responsive(
                scope.root.clone(),
                move |b: &mut ScopeBuilder<'_>| register_defs(b, &defs),
                tree,
            )?;
            handles.scopes.push(handle);
        }
        for m in &config.marquees {
            handles
                .marquees
                .push(stage.add_marquee(m.target.clone(), m.content_width, m.speeds, tree)?);
        }
        for c in &config.carousels {
            let id = stage.start_carousel(c.items.clone(), c.interval_secs)?;
            handles.carousels.insert(c.name.clone(), id);
        }
        for b in &config.bursts {
            handles.bursts.insert(b.name.clone(), stage.add_burst(b.config)?);
        }
        tracing::debug!(
            scopes = handles.scopes.len(),
            marquees = handles.marquees.len(),
            "stage built"
        );
        Ok((stage, handles))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/config.rs"]
mod tests;
