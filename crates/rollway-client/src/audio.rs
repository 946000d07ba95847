// audio.rs — sound cue facade
//
// Mixing happens in the platform layer; the screens only name cues. The
// facade forwards to whatever sink is installed and keeps the last few
// cues around so flows can be asserted on without a sound device.

pub const AUD_MENU: &str = "snd/menu.ogg";
pub const AUD_BACK: &str = "snd/back.ogg";
pub const AUD_DISABLED: &str = "snd/disabled.ogg";
pub const AUD_BUY_PRODUCT: &str = "snd/buyproduct.ogg";
pub const AUD_EXTRA_LIVES: &str = "snd/extralives.ogg";
pub const AUD_UI_ERROR: &str = "snd/uierror.ogg";
pub const AUD_WARNING: &str = "snd/warning.ogg";
pub const AUD_SHATTER: &str = "snd/shatter.ogg";
pub const AUD_RESPAWN: &str = "snd/respawn.ogg";
pub const AUD_BALL: &str = "snd/ball.ogg";
pub const AUD_SCORE: &str = "snd/narrator/score.ogg";
pub const AUD_OVER: &str = "snd/narrator/over.ogg";
pub const AUD_BANKRUPT: &str = "snd/bankrupt.ogg";

const CUE_HISTORY: usize = 32;

pub trait AudioSink {
    fn play(&mut self, path: &str, volume: f32);
    fn music_fade_out(&mut self, t: f32);
    fn music_fade_in(&mut self, t: f32);
}

#[derive(Default)]
pub struct Audio {
    sink: Option<Box<dyn AudioSink>>,
    recent: Vec<String>,
}

impl Audio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
    }

    pub fn play(&mut self, path: &str, volume: f32) {
        if self.recent.len() == CUE_HISTORY {
            self.recent.remove(0);
        }
        self.recent.push(path.to_string());

        if let Some(sink) = self.sink.as_mut() {
            sink.play(path, volume);
        }
    }

    /// Narrator lines go through the same path; kept separate so a sink
    /// can duck music under them.
    pub fn narrator_play(&mut self, path: &str) {
        self.play(path, 1.0);
    }

    pub fn music_fade_out(&mut self, t: f32) {
        if let Some(sink) = self.sink.as_mut() {
            sink.music_fade_out(t);
        }
    }

    pub fn music_fade_in(&mut self, t: f32) {
        if let Some(sink) = self.sink.as_mut() {
            sink.music_fade_in(t);
        }
    }

    pub fn last_cue(&self) -> Option<&str> {
        self.recent.last().map(String::as_str)
    }

    pub fn cues(&self) -> &[String] {
        &self.recent
    }
}
