//! Ordered, failure-isolated plugin dispatch.

use std::panic::{catch_unwind, AssertUnwindSafe};

use voice_input_core::{RecordingState, Result, Transcript};

use crate::plugin::Plugin;

/// The plugin registry of one session. Insertion order is dispatch order.
#[derive(Default)]
pub struct PluginDispatcher {
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for PluginDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

impl PluginDispatcher {
    /// A registry dispatching to `plugins` in the given order.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// `on_result`, then `on_update` (interim) or `on_finish` (final), per plugin.
    pub fn dispatch_transcript(&mut self, transcript: &Transcript) {
        let text = transcript.text.as_str();
        for plugin in self.plugins.iter_mut() {
            isolate(plugin.as_mut(), "on_result", |p| {
                p.on_result(text, transcript.interim)
            });
            if transcript.interim {
                isolate(plugin.as_mut(), "on_update", |p| p.on_update(text));
            } else {
                isolate(plugin.as_mut(), "on_finish", |p| p.on_finish(text));
            }
        }
    }

    pub fn dispatch_state(&mut self, state: RecordingState) {
        for plugin in self.plugins.iter_mut() {
            isolate(plugin.as_mut(), "on_state_change", |p| {
                p.on_state_change(state)
            });
        }
    }

    /// Empty the registry, handing back its plugins in order.
    pub fn take_all(&mut self) -> Vec<Box<dyn Plugin>> {
        std::mem::take(&mut self.plugins)
    }
}

/// Dispose each plugin once, in order, isolating failures.
pub fn dispose_plugins(plugins: Vec<Box<dyn Plugin>>) {
    for mut plugin in plugins {
        isolate(plugin.as_mut(), "dispose", |p| p.dispose());
    }
}

fn isolate<F>(plugin: &mut dyn Plugin, handler: &str, f: F)
where
    F: FnOnce(&mut dyn Plugin) -> Result<()>,
{
    let outcome = catch_unwind(AssertUnwindSafe(|| f(&mut *plugin)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(plugin = plugin.name(), handler, error = %e, "Plugin handler failed");
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(plugin = plugin.name(), handler, panic = %message, "Plugin handler panicked");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use voice_input_core::VoiceInputError;

    use crate::plugin::FnPlugin;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(name: &'static str, log: &Log) -> Box<dyn Plugin> {
        let (l1, l2, l3, l4, l5) = (
            log.clone(),
            log.clone(),
            log.clone(),
            log.clone(),
            log.clone(),
        );
        Box::new(
            FnPlugin::new(name)
                .with_result(move |t, interim| {
                    l1.lock()
                        .unwrap()
                        .push(format!("{}:result:{}:{}", name, t, interim));
                    Ok(())
                })
                .with_update(move |t| {
                    l2.lock().unwrap().push(format!("{}:update:{}", name, t));
                    Ok(())
                })
                .with_finish(move |t| {
                    l3.lock().unwrap().push(format!("{}:finish:{}", name, t));
                    Ok(())
                })
                .with_state_change(move |s| {
                    l4.lock()
                        .unwrap()
                        .push(format!("{}:state:{}", name, s.recording));
                    Ok(())
                })
                .with_dispose(move || {
                    l5.lock().unwrap().push(format!("{}:dispose", name));
                    Ok(())
                }),
        )
    }

    fn transcript(text: &str, interim: bool) -> Transcript {
        Transcript {
            text: text.to_string(),
            interim,
        }
    }

    #[test]
    fn test_interim_goes_to_update_in_order() {
        let log = Log::default();
        let mut d = PluginDispatcher::new(vec![recorder("a", &log), recorder("b", &log)]);
        d.dispatch_transcript(&transcript("hel", true));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:result:hel:true",
                "a:update:hel",
                "b:result:hel:true",
                "b:update:hel",
            ]
        );
    }

    #[test]
    fn test_final_goes_to_finish() {
        let log = Log::default();
        let mut d = PluginDispatcher::new(vec![recorder("a", &log)]);
        d.dispatch_transcript(&transcript("hello", false));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:result:hello:false", "a:finish:hello"]
        );
    }

    #[test]
    fn test_failing_plugin_does_not_block_others() {
        let log = Log::default();
        let failing: Box<dyn Plugin> = Box::new(
            FnPlugin::new("failing")
                .with_update(|_| Err(VoiceInputError::plugin("failing", "boom"))),
        );
        let mut d = PluginDispatcher::new(vec![
            recorder("a", &log),
            failing,
            recorder("b", &log),
        ]);
        d.dispatch_transcript(&transcript("x", true));
        let log = log.lock().unwrap();
        assert!(log.contains(&"a:update:x".to_string()));
        assert!(log.contains(&"b:update:x".to_string()));
    }

    #[test]
    fn test_panicking_plugin_does_not_block_others() {
        let log = Log::default();
        let panicking: Box<dyn Plugin> = Box::new(
            FnPlugin::new("panicking").with_state_change(|_| panic!("listener exploded")),
        );
        let mut d = PluginDispatcher::new(vec![panicking, recorder("b", &log)]);
        d.dispatch_state(RecordingState { recording: true });
        assert_eq!(*log.lock().unwrap(), vec!["b:state:true"]);
    }

    #[test]
    fn test_duplicates_are_dispatched_independently() {
        let log = Log::default();
        let mut d = PluginDispatcher::new(vec![recorder("a", &log), recorder("a", &log)]);
        d.dispatch_state(RecordingState { recording: false });
        assert_eq!(*log.lock().unwrap(), vec!["a:state:false", "a:state:false"]);
    }

    #[test]
    fn test_take_all_and_dispose_in_order() {
        let log = Log::default();
        let failing: Box<dyn Plugin> = Box::new(
            FnPlugin::new("failing")
                .with_dispose(|| Err(VoiceInputError::plugin("failing", "busy"))),
        );
        let mut d = PluginDispatcher::new(vec![recorder("a", &log), failing, recorder("b", &log)]);
        assert_eq!(d.len(), 3);

        dispose_plugins(d.take_all());
        assert!(d.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["a:dispose", "b:dispose"]);

        // Nothing left to dispose a second time.
        dispose_plugins(d.take_all());
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
