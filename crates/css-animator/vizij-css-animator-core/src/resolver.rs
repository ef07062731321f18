//! Vendor-aware names for animation events and style properties.

use serde::{Deserialize, Serialize};

use crate::host::Host;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationEventKind {
    Start,
    Iteration,
    End,
}

impl AnimationEventKind {
    pub fn standard_name(self) -> &'static str {
        match self {
            Self::Start => "animationstart",
            Self::Iteration => "animationiteration",
            Self::End => "animationend",
        }
    }

    fn camel(self) -> &'static str {
        match self {
            Self::Start => "AnimationStart",
            Self::Iteration => "AnimationIteration",
            Self::End => "AnimationEnd",
        }
    }
}

/// Vendor prefix the running engine uses for animation properties.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorPrefix {
    #[default]
    None,
    Webkit,
    Moz,
    Ms,
    O,
}

impl VendorPrefix {
    /// Map a DOM style prefix (`webkit`, `Moz`, `ms`, ...) to a vendor.
    pub fn from_dom_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "webkit" | "Webkit" => Some(Self::Webkit),
            "Moz" | "moz" => Some(Self::Moz),
            "ms" | "MS" => Some(Self::Ms),
            "O" | "o" => Some(Self::O),
            _ => None,
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Webkit => "-webkit-",
            Self::Moz => "-moz-",
            Self::Ms => "-ms-",
            Self::O => "-o-",
        }
    }

    fn event(self) -> &'static str {
        match self {
            Self::None | Self::Webkit => "webkit",
            Self::Moz => "Moz",
            Self::Ms => "MS",
            Self::O => "o",
        }
    }
}

/// Resolves logical animation names to what the running engine understands.
pub trait StyleResolver {
    /// Every event name to subscribe to for `kind`.
    fn event_names(&self, kind: AnimationEventKind) -> Vec<String>;

    /// Computed-style property names for a logical property, probed in order.
    fn style_properties(&self, property: &str) -> Vec<String>;
}

/// Resolver for a vendor prefix detected once at startup.
#[derive(Clone, Debug, Default)]
pub struct VendorResolver {
    prefix: VendorPrefix,
}

impl VendorResolver {
    pub fn new(prefix: VendorPrefix) -> Self {
        Self { prefix }
    }
}

impl StyleResolver for VendorResolver {
    fn event_names(&self, kind: AnimationEventKind) -> Vec<String> {
        vec![
            kind.standard_name().to_string(),
            format!("{}{}", self.prefix.event(), kind.camel()),
        ]
    }

    fn style_properties(&self, property: &str) -> Vec<String> {
        match self.prefix {
            VendorPrefix::None => vec![
                property.to_string(),
                format!("-webkit-{property}"),
                format!("-moz-{property}"),
            ],
            prefix => vec![format!("{}{property}", prefix.css()), property.to_string()],
        }
    }
}

/// First non-empty computed value among the resolver's candidates.
pub fn resolve_style<H: Host>(
    host: &H,
    resolver: &dyn StyleResolver,
    element: &H::Element,
    property: &str,
) -> String {
    resolver
        .style_properties(property)
        .iter()
        .map(|name| host.computed_style(element, name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

/// Parse a CSS `<time>` (first entry of a list) into milliseconds.
///
/// Empty, `none`, negative and malformed values yield `0.0`.
pub fn parse_time_ms(value: &str) -> f64 {
    let first = value.split(',').next().unwrap_or("").trim();
    if first.is_empty() || first == "none" {
        return 0.0;
    }
    let ms = if let Some(n) = first.strip_suffix("ms") {
        n.trim().parse::<f64>().ok()
    } else if let Some(n) = first.strip_suffix('s') {
        n.trim().parse::<f64>().ok().map(|s| s * 1000.0)
    } else {
        first.parse::<f64>().ok().map(|s| s * 1000.0)
    };
    match ms {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Parse a CSS `animation-iteration-count` (first entry of a list).
///
/// `None` for `infinite`; empty or malformed values count as one iteration.
pub fn parse_iteration_count(value: &str) -> Option<f64> {
    let first = value.split(',').next().unwrap_or("").trim();
    if first == "infinite" {
        return None;
    }
    match first.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
        _ => Some(1.0),
    }
}
