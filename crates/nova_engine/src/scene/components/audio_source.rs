//! Audio source component

use std::any::Any;
use std::sync::Arc;

use crate::audio::{AudioBuffer, AudioSink};
use crate::scene::component::{Behaviour, Component, ComponentKind, Context};

/// Behaviour-kind component playing a pre-decoded buffer
///
/// Playback goes through the scene's audio sink; without one the source
/// is inert. Owns no hierarchy state.
pub struct AudioSource {
    behaviour: Behaviour,
    /// Buffer to play
    pub buffer: Option<AudioBuffer>,
    /// Playback volume in `[0, 1]`
    pub volume: f32,
    /// Whether playback loops
    pub looped: bool,
    /// Whether playback begins when the entity starts
    pub play_on_start: bool,
    sink: Option<Arc<dyn AudioSink>>,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            behaviour: Behaviour::new(),
            buffer: None,
            volume: 1.0,
            looped: false,
            play_on_start: false,
            sink: None,
        }
    }
}

impl AudioSource {
    /// Source for the given buffer
    pub fn new(buffer: AudioBuffer) -> Self {
        Self {
            buffer: Some(buffer),
            ..Default::default()
        }
    }

    /// Builder pattern: loop playback
    pub fn looped(mut self) -> Self {
        self.looped = true;
        self
    }

    /// Builder pattern: begin playback when the entity starts
    pub fn play_on_start(mut self) -> Self {
        self.play_on_start = true;
        self
    }

    /// Builder pattern: set the volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Start playback through the scene's audio sink
    pub fn play(&mut self, ctx: &Context<'_>) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        let Some(sink) = ctx.entity.scene().and_then(|s| s.services().audio()) else {
            log::debug!("no audio sink injected; \"{}\" stays silent", buffer.name);
            return;
        };
        sink.play(buffer, self.volume, self.looped);
        self.sink = Some(sink);
    }

    /// Stop playback started from this source
    pub fn stop(&mut self) {
        if let (Some(sink), Some(buffer)) = (self.sink.take(), self.buffer.as_ref()) {
            sink.stop(buffer);
        }
    }
}

impl Component for AudioSource {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Script
    }

    fn start(&mut self, ctx: &Context<'_>) {
        if self.play_on_start {
            self.play(ctx);
        }
    }

    fn on_destroy(&mut self) {
        self.stop();
    }

    fn behaviour(&self) -> Option<&Behaviour> {
        Some(&self.behaviour)
    }

    fn behaviour_mut(&mut self) -> Option<&mut Behaviour> {
        Some(&mut self.behaviour)
    }

    fn duplicate(&self) -> Option<Box<dyn Component>> {
        Some(Box::new(Self {
            behaviour: Behaviour::new(),
            buffer: self.buffer.clone(),
            volume: self.volume,
            looped: self.looped,
            play_on_start: self.play_on_start,
            sink: None,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
