//! Tick driver: runs one captured frame through hinting, overlay planning and
//! autoplay.
//!
//! Frames must be fed strictly in arrival order; `process_frame` takes
//! `&mut self`, so a tick always runs to completion before the next starts.
use crate::autoplay::{Action, AutoplayController, PointerActuator, Validity};
use crate::config::Settings;
use crate::engine::Frame;
use crate::hinter::{HintEngine, Hints};
use crate::overlay::{self, Blink, Mark};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, warn};

/// Everything one tick produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub validity: Validity,
    /// `None` when the board was not trusted enough to search.
    pub hints: Option<Hints>,
    pub overlay: Vec<Mark>,
    /// `None` when autoplay is switched off.
    pub action: Option<Action>,
}

pub struct Session {
    settings: Settings,
    hinter: HintEngine,
    autoplay: AutoplayController,
    blink: Blink,
    rng: SmallRng,
    ticks: u64,
}

impl Session {
    /// Builds a session; the RNG is seeded from `settings.seed` when given.
    pub fn new(settings: Settings) -> Self {
        let rng = match settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Session {
            hinter: HintEngine::new(settings.hint_config()),
            autoplay: AutoplayController::new(settings.autoplay_config()),
            settings,
            blink: Blink::default(),
            rng,
            ticks: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies new settings between ticks. A pending half move is kept
    /// unless autoplay is switched off.
    pub fn update_settings(&mut self, settings: Settings) {
        self.hinter = HintEngine::new(settings.hint_config());
        self.autoplay.set_config(settings.autoplay_config());
        if !settings.autoplay {
            self.autoplay.reset();
        }
        self.settings = settings;
    }

    pub fn autoplay(&self) -> &AutoplayController {
        &self.autoplay
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Processes one frame captured at `now`.
    pub fn process_frame<A>(&mut self, frame: &Frame, now: Instant, actuator: &mut A) -> TickReport
    where
        A: PointerActuator + ?Sized,
    {
        self.ticks += 1;
        let board = &frame.board;
        if board.width() != self.settings.columns || board.height() != self.settings.rows {
            warn!(
                width = board.width(),
                height = board.height(),
                columns = self.settings.columns,
                rows = self.settings.rows,
                "board size differs from configured grid"
            );
        }

        let validity = self.autoplay.assess(board);
        debug!(
            tick = self.ticks,
            invalid = board.invalid_count(),
            total = board.total(),
            ?validity,
            "frame assessed"
        );

        let hints = (validity == Validity::Trusted).then(|| {
            self.hinter
                .process(board, frame.image, self.settings.highlight_mode, &mut self.rng)
        });

        let overlay = hints
            .as_ref()
            .map(|h| overlay::plan(h.displayed(), self.blink, self.settings.highlight_cutoff))
            .unwrap_or_default();
        self.blink.advance();

        let action = if self.settings.autoplay {
            let shown = hints.as_ref().map_or(&[][..], Hints::displayed);
            Some(
                self.autoplay
                    .tick(validity, shown, now, &mut self.rng, actuator),
            )
        } else {
            None
        };

        TickReport {
            validity,
            hints,
            overlay,
            action,
        }
    }
}
