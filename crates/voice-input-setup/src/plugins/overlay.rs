//! Floating overlay showing the interim transcript while it is spoken.

use std::collections::BTreeMap;
use std::sync::Arc;

use voice_input_core::config::OverlayConfig;
use voice_input_core::Result;
use voice_input_engine::Plugin;

/// Class name and CSS declarations applied to the overlay element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    pub class_name: String,
    pub style: BTreeMap<String, String>,
}

impl From<&OverlayConfig> for OverlayStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            class_name: config.class_name.clone(),
            style: config.style.clone(),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

/// Host surface able to render the overlay.
pub trait Overlay: Send + Sync {
    /// Create the overlay if needed, apply `style`, make it visible and set its text.
    fn show(&self, text: &str, style: &OverlayStyle) -> Result<()>;

    fn hide(&self) -> Result<()>;

    /// Remove the overlay from the host entirely.
    fn remove(&self) -> Result<()>;
}

pub struct OverlayPlugin {
    overlay: Arc<dyn Overlay>,
    style: OverlayStyle,
    created: bool,
}

impl OverlayPlugin {
    pub fn new(overlay: Arc<dyn Overlay>, style: OverlayStyle) -> Self {
        Self {
            overlay,
            style,
            created: false,
        }
    }
}

impl Plugin for OverlayPlugin {
    fn name(&self) -> &str {
        "overlay"
    }

    fn on_update(&mut self, transcript: &str) -> Result<()> {
        self.created = true;
        self.overlay.show(transcript, &self.style)
    }

    fn on_finish(&mut self, _transcript: &str) -> Result<()> {
        if self.created {
            self.overlay.hide()?;
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        if std::mem::take(&mut self.created) {
            self.overlay.remove()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeOverlay {
        calls: Mutex<Vec<String>>,
    }

    impl Overlay for FakeOverlay {
        fn show(&self, text: &str, style: &OverlayStyle) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("show:{}:{}", style.class_name, text));
            Ok(())
        }

        fn hide(&self) -> Result<()> {
            self.calls.lock().unwrap().push("hide".to_string());
            Ok(())
        }

        fn remove(&self) -> Result<()> {
            self.calls.lock().unwrap().push("remove".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_update_shows_and_finish_hides() {
        let overlay = Arc::new(FakeOverlay::default());
        let mut plugin = OverlayPlugin::new(overlay.clone(), OverlayStyle::default());

        plugin.on_update("hel").unwrap();
        plugin.on_update("hello").unwrap();
        plugin.on_finish("hello").unwrap();
        plugin.dispose().unwrap();

        assert_eq!(
            *overlay.calls.lock().unwrap(),
            vec![
                "show:voice-input-modal:hel",
                "show:voice-input-modal:hello",
                "hide",
                "remove"
            ]
        );
    }

    #[test]
    fn test_untouched_overlay_is_never_hidden_or_removed() {
        let overlay = Arc::new(FakeOverlay::default());
        let mut plugin = OverlayPlugin::new(overlay.clone(), OverlayStyle::default());

        plugin.on_finish("spoken without interim").unwrap();
        plugin.dispose().unwrap();

        assert!(overlay.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_style_from_config() {
        let mut config = OverlayConfig::default();
        config.class_name = "dictation".to_string();
        config.style.insert("color".to_string(), "red".to_string());

        let style = OverlayStyle::from(&config);
        assert_eq!(style.class_name, "dictation");
        assert_eq!(style.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(style.style.get("position").map(String::as_str), Some("fixed"));
    }
}
