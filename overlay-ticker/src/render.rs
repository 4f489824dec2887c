use log::*;
use ticker_common::{
    frame::{Animation, OverlayFrame, SlotView, TickerCue, format_scoreboard},
    timing::WINDOW_SIZE,
};

/// The display surface the engine draws on. Implementations decide what
/// "drawing" means; the engine only hands over finished strings and
/// transition cues.
pub trait RenderTarget {
    fn draw_ticker(&mut self, slots: [Option<SlotView>; WINDOW_SIZE]);
    fn set_ticker_cue(&mut self, cue: Option<TickerCue>);
    fn draw_scoreboard(&mut self, score: u32);
    fn play_animation(&mut self, animation: Animation);
}

/// Somewhere finished frames can be sent
pub trait FrameSink {
    fn publish(&mut self, frame: &OverlayFrame);
}

impl FrameSink for Vec<OverlayFrame> {
    fn publish(&mut self, frame: &OverlayFrame) {
        self.push(frame.clone());
    }
}

/// Keeps a complete copy of what should be on screen and pushes it to the
/// sink after every change
#[derive(Debug)]
pub struct FrameOutput<S> {
    frame: OverlayFrame,
    sink: S,
}

impl<S: FrameSink> FrameOutput<S> {
    pub fn new(sink: S) -> Self {
        Self {
            frame: OverlayFrame {
                scoreboard: format_scoreboard(0),
                ..Default::default()
            },
            sink,
        }
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn publish(&mut self) {
        self.sink.publish(&self.frame);
        self.frame.animation = None;
    }
}

impl<S: FrameSink> RenderTarget for FrameOutput<S> {
    fn draw_ticker(&mut self, slots: [Option<SlotView>; WINDOW_SIZE]) {
        if slots == self.frame.slots {
            return;
        }
        self.frame.slots = slots;
        self.publish();
    }

    fn set_ticker_cue(&mut self, cue: Option<TickerCue>) {
        trace!("Ticker cue set to {cue:?}");
        self.frame.cue = cue;
        self.publish();
    }

    fn draw_scoreboard(&mut self, score: u32) {
        self.frame.scoreboard = format_scoreboard(score);
        self.publish();
    }

    fn play_animation(&mut self, animation: Animation) {
        debug!("Playing {}", animation.clip());
        self.frame.animation = Some(animation);
        self.publish();
    }
}
