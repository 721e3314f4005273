//! Embed host: decides how a third-party game is mounted and drives the
//! fullscreen toggle. All DOM work goes through [`EmbedPlatform`] so the
//! host runs unchanged against the browser or a test double.

use serde::Serialize;

use crate::game::{Game, GameId};

/// Permissions granted to framed games.
pub const FRAME_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

/// Sandbox tokens applied to framed games.
pub const FRAME_SANDBOX: &str =
    "allow-scripts allow-same-origin allow-pointer-lock allow-forms allow-popups";

/// Markers that make an embed payload raw markup rather than a URL.
const MARKUP_MARKERS: [&str; 2] = ["<div>", "<script"];

/// True when the payload must be injected as HTML instead of framed.
pub fn is_markup(embed: &str) -> bool {
    MARKUP_MARKERS.iter().any(|m| embed.contains(m))
}

/// Frame source used when a game carries no embed payload.
pub fn fallback_src(id: &GameId) -> String {
    format!("/embed/{id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    Mount(String),
    Fullscreen(String),
}

impl std::fmt::Display for EmbedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mount(e) => write!(f, "embed mount failed: {e}"),
            Self::Fullscreen(e) => write!(f, "fullscreen request failed: {e}"),
        }
    }
}

impl std::error::Error for EmbedError {}

/// How a game is presented in the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EmbedView {
    /// Empty, invisible placeholder.
    Hidden,
    Frame { src: String, title: String },
    Markup { markup: String, title: String },
}

impl EmbedView {
    pub fn for_game(game: Option<&Game>) -> Self {
        let Some(game) = game.filter(|g| !g.id.is_blank()) else {
            return Self::Hidden;
        };
        let title = if game.title.trim().is_empty() {
            "Play Game".to_string()
        } else {
            format!("Play {}", game.title)
        };
        match game.embed.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(embed) if is_markup(embed) => Self::Markup {
                markup: embed.to_string(),
                title,
            },
            Some(url) => Self::Frame {
                src: url.trim().to_string(),
                title,
            },
            None => Self::Frame {
                src: fallback_src(&game.id),
                title,
            },
        }
    }

    /// Element that fullscreen should be requested on, if any.
    pub fn fullscreen_target(&self) -> Option<FullscreenTarget> {
        match self {
            Self::Hidden => None,
            Self::Frame { .. } => Some(FullscreenTarget::Frame),
            Self::Markup { .. } => Some(FullscreenTarget::MarkupContainer),
        }
    }

    pub fn frame_attributes(&self) -> Option<FrameAttributes> {
        match self {
            Self::Frame { src, title } => Some(FrameAttributes {
                src: src.clone(),
                title: title.clone(),
                allow: FRAME_ALLOW,
                sandbox: FRAME_SANDBOX,
                allow_fullscreen: true,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FullscreenTarget {
    MarkupContainer,
    Frame,
}

/// Attributes of the sandboxed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAttributes {
    pub src: String,
    pub title: String,
    pub allow: &'static str,
    pub sandbox: &'static str,
    pub allow_fullscreen: bool,
}

/// Snapshot of a `<script>` element: attributes in source order plus its
/// inline body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptElement {
    pub attributes: Vec<(String, String)>,
    pub body: String,
}

impl ScriptElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Browser surface the host drives.
pub trait EmbedPlatform {
    /// Whether any element in the document is currently fullscreen.
    fn fullscreen_active(&self) -> bool;

    fn request_fullscreen(&mut self, target: FullscreenTarget) -> Result<(), EmbedError>;

    fn exit_fullscreen(&mut self) -> Result<(), EmbedError>;

    /// Inject `markup` verbatim into the container. Returns the script
    /// elements found in it, in document order. Those elements are inert
    /// until replaced through [`EmbedPlatform::replace_script`].
    fn mount_markup(&mut self, markup: &str) -> Result<Vec<ScriptElement>, EmbedError>;

    /// Replace the `index`-th injected script with a newly created element
    /// carrying `script`'s attributes and body.
    fn replace_script(&mut self, index: usize, script: &ScriptElement) -> Result<(), EmbedError>;

    fn mount_frame(&mut self, frame: &FrameAttributes) -> Result<(), EmbedError>;

    /// Remove whatever is mounted and hide the placeholder.
    fn clear(&mut self);
}

/// Hosts one game at a time and tracks the fullscreen indicator.
pub struct EmbedHost<P: EmbedPlatform> {
    platform: P,
    view: EmbedView,
    fullscreen: bool,
}

impl<P: EmbedPlatform> EmbedHost<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            view: EmbedView::Hidden,
            fullscreen: false,
        }
    }

    pub fn view(&self) -> &EmbedView {
        &self.view
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Mount `game`, replacing anything mounted before. Platform failures
    /// are logged and leave the player as-is.
    pub fn mount(&mut self, game: Option<&Game>) {
        self.view = EmbedView::for_game(game);
        let result = match &self.view {
            EmbedView::Hidden => {
                self.platform.clear();
                Ok(())
            },
            EmbedView::Frame { .. } => match self.view.frame_attributes() {
                Some(frame) => self.platform.mount_frame(&frame),
                None => Ok(()),
            },
            EmbedView::Markup { markup, .. } => inject_markup(&mut self.platform, markup),
        };
        if let Err(e) = result {
            tracing::debug!("Ignoring embed failure: {e}");
        }
    }

    /// Enter fullscreen on the active element when nothing is fullscreen,
    /// exit otherwise. The indicator follows [`EmbedHost::on_fullscreen_change`].
    pub fn toggle_fullscreen(&mut self) {
        let result = if self.platform.fullscreen_active() {
            self.platform.exit_fullscreen()
        } else if let Some(target) = self.view.fullscreen_target() {
            self.platform.request_fullscreen(target)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            tracing::debug!("Ignoring fullscreen failure: {e}");
        }
    }

    /// Resync the indicator with the browser, e.g. after Escape.
    pub fn on_fullscreen_change(&mut self) {
        self.fullscreen = self.platform.fullscreen_active();
    }
}

/// Scripts injected through markup never execute; each one is swapped for a
/// fresh element with identical attributes and body.
fn inject_markup<P: EmbedPlatform>(platform: &mut P, markup: &str) -> Result<(), EmbedError> {
    let inert = platform.mount_markup(markup)?;
    for (index, script) in inert.iter().enumerate() {
        platform.replace_script(index, script)?;
    }
    Ok(())
}
