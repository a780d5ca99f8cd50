//! Hook registry.

use crate::policy::Policy;
use purify_dom::{Document, NodeId};
use rustc_hash::FxHashMap;
use std::fmt;

/// Extension points, in the order they fire for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    BeforeSanitizeElements,
    UponSanitizeElement,
    AfterSanitizeElements,
    BeforeSanitizeAttributes,
    UponSanitizeAttribute,
    AfterSanitizeAttributes,
    BeforeSanitizeShadowDom,
    UponSanitizeShadowNode,
    AfterSanitizeShadowDom,
}

impl HookPoint {
    pub const ALL: [HookPoint; 9] = [
        HookPoint::BeforeSanitizeElements,
        HookPoint::UponSanitizeElement,
        HookPoint::AfterSanitizeElements,
        HookPoint::BeforeSanitizeAttributes,
        HookPoint::UponSanitizeAttribute,
        HookPoint::AfterSanitizeAttributes,
        HookPoint::BeforeSanitizeShadowDom,
        HookPoint::UponSanitizeShadowNode,
        HookPoint::AfterSanitizeShadowDom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeSanitizeElements => "beforeSanitizeElements",
            Self::UponSanitizeElement => "uponSanitizeElement",
            Self::AfterSanitizeElements => "afterSanitizeElements",
            Self::BeforeSanitizeAttributes => "beforeSanitizeAttributes",
            Self::UponSanitizeAttribute => "uponSanitizeAttribute",
            Self::AfterSanitizeAttributes => "afterSanitizeAttributes",
            Self::BeforeSanitizeShadowDom => "beforeSanitizeShadowDOM",
            Self::UponSanitizeShadowNode => "uponSanitizeShadowNode",
            Self::AfterSanitizeShadowDom => "afterSanitizeShadowDOM",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element-stage payload. Setting `allowed` overrides the tag decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCheck {
    pub tag_name: String,
    pub allowed: bool,
}

/// Attribute-stage payload.
///
/// `keep_attr = false` drops the attribute; `force_keep_attr = true` keeps it without running the
/// validity checks. `attr_value` is what gets written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCheck {
    pub attr_name: String,
    pub attr_value: String,
    pub keep_attr: bool,
    pub force_keep_attr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookData {
    Node,
    Element(ElementCheck),
    Attribute(AttributeCheck),
}

pub struct HookContext<'a> {
    pub document: &'a mut Document,
    pub node: NodeId,
    pub data: HookData,
    pub policy: &'a Policy,
}

pub type Hook = Box<dyn FnMut(&mut HookContext<'_>) + Send>;

/// Per-point hook stacks.
#[derive(Default)]
pub struct HookRegistry {
    stacks: FxHashMap<HookPoint, Vec<Hook>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in HookPoint::ALL {
            let len = self.len(point);
            if len > 0 {
                map.entry(&point, &len);
            }
        }
        map.finish()
    }
}

impl HookRegistry {
    pub fn add(&mut self, point: HookPoint, hook: Hook) {
        self.stacks.entry(point).or_default().push(hook);
    }

    /// Pops the most recently added hook of `point`.
    pub fn remove(&mut self, point: HookPoint) -> Option<Hook> {
        self.stacks.get_mut(&point)?.pop()
    }

    pub fn clear(&mut self, point: HookPoint) {
        self.stacks.remove(&point);
    }

    pub fn clear_all(&mut self) {
        self.stacks.clear();
    }

    pub fn len(&self, point: HookPoint) -> usize {
        self.stacks.get(&point).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.values().all(Vec::is_empty)
    }

    /// Runs every hook of `point` in registration order and returns the (possibly rewritten)
    /// payload.
    pub(crate) fn run(
        &mut self,
        point: HookPoint,
        document: &mut Document,
        node: NodeId,
        data: HookData,
        policy: &Policy,
    ) -> HookData {
        let Some(stack) = self.stacks.get_mut(&point).filter(|s| !s.is_empty()) else {
            return data;
        };
        let mut ctx = HookContext {
            document,
            node,
            data,
            policy,
        };
        for hook in stack.iter_mut() {
            hook(&mut ctx);
        }
        ctx.data
    }
}
