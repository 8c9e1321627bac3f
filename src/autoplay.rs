//! Autoplay: decides, once per captured frame, where (if anywhere) to click.
//!
//! The controller is a two-state machine. A swap normally needs two clicks;
//! when it commits to the best (or only) move it clicks the first tile, parks
//! the hint in `HalfMoveDone`, and finishes the move on the next trusted
//! frame. Frames that cannot be trusted never touch the pending move.
use crate::engine::Board;
use crate::geometry::{Point, Rect};
use crate::hinter::Hint;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Something that can synthesize a press-then-release at an absolute screen
/// position. Implementations are platform specific.
pub trait PointerActuator {
    fn click(&mut self, at: Point);
}

impl<T: PointerActuator + ?Sized> PointerActuator for &mut T {
    fn click(&mut self, at: Point) {
        (**self).click(at);
    }
}

/// Actuator that only remembers where it was asked to click.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingActuator {
    pub clicks: Vec<Point>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and forgets the clicks recorded so far.
    pub fn take(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.clicks)
    }
}

impl PointerActuator for RecordingActuator {
    fn click(&mut self, at: Point) {
        self.clicks.push(at);
    }
}

/// How far a board can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    /// Below the invalid threshold; hints may be acted on.
    Trusted,
    /// At or above the threshold but at most half unknown: probably a dialog
    /// covering part of the board.
    Unreliable,
    /// More than half unknown: a loading or transition screen.
    Loading,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayState {
    Idle,
    /// The first click of `Hint` has been issued; its `point_to` is still due.
    HalfMoveDone(Hint),
}

/// What the controller did on one tick. Points are absolute screen
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do: loading screen, or no region to click in.
    Wait,
    /// A dismissal was due but the last one is too recent.
    Throttled,
    Dismiss(Point),
    /// Random click because no hint exists.
    Explore(Point),
    /// Second click of a move started on an earlier tick.
    FinishMove(Point),
    /// First click of a move; the second follows next tick.
    StartMove(Point),
    /// Both clicks of a randomly chosen move.
    Swap(Point, Point),
}

impl Action {
    /// Number of clicks this action issued.
    pub fn clicks(&self) -> usize {
        match self {
            Action::Wait | Action::Throttled => 0,
            Action::Dismiss(_)
            | Action::Explore(_)
            | Action::FinishMove(_)
            | Action::StartMove(_) => 1,
            Action::Swap(_, _) => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoplayConfig {
    /// Percentage of unknown cells at which a board stops being trusted.
    pub invalid_threshold: u32,
    /// Always commit to the top-ranked hint over two ticks.
    pub prefer_best_move: bool,
    /// Screen rectangle the board image was captured from.
    pub capture_region: Rect,
    /// Dialog dismissal point, relative to the capture region origin.
    pub dismiss_offset: Point,
    /// Maximum random displacement of the dismissal click on each axis.
    pub dismiss_jitter: u32,
    /// Minimum time between two dismissal clicks.
    pub dismiss_interval: Duration,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        AutoplayConfig {
            invalid_threshold: 10,
            prefer_best_move: false,
            capture_region: Rect::new(0, 0, 252, 330),
            dismiss_offset: Point::new(126, 165),
            dismiss_jitter: 5,
            dismiss_interval: Duration::from_millis(400),
        }
    }
}

/// The per-tick decision procedure and the state it carries between ticks.
#[derive(Clone, Debug)]
pub struct AutoplayController {
    config: AutoplayConfig,
    state: AutoplayState,
    last_dismiss: Option<Instant>,
}

impl AutoplayController {
    pub fn new(config: AutoplayConfig) -> Self {
        AutoplayController {
            config,
            state: AutoplayState::Idle,
            last_dismiss: None,
        }
    }

    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }

    /// Replaces the configuration; the pending move survives.
    pub fn set_config(&mut self, config: AutoplayConfig) {
        self.config = config;
    }

    pub fn state(&self) -> &AutoplayState {
        &self.state
    }

    /// Drops any pending move and the dismissal throttle.
    pub fn reset(&mut self) {
        self.state = AutoplayState::Idle;
        self.last_dismiss = None;
    }

    /// Classifies `board` by its share of unknown cells.
    ///
    /// A board is untrusted once `invalid_count / total` reaches
    /// `invalid_threshold` percent; an untrusted board with more than half of
    /// its cells unknown is a loading screen. A board without cells counts as
    /// loading.
    pub fn assess(&self, board: &Board) -> Validity {
        let total = board.total() as u64;
        let invalid = board.invalid_count() as u64;
        if total == 0 {
            return Validity::Loading;
        }
        if invalid * 100 < u64::from(self.config.invalid_threshold) * total {
            Validity::Trusted
        } else if invalid * 2 > total {
            Validity::Loading
        } else {
            Validity::Unreliable
        }
    }

    /// Runs one decision cycle.
    ///
    /// `hints` is the ranked list for this frame and is ignored unless
    /// `validity` is `Trusted`. Every click goes through `actuator` in
    /// absolute screen coordinates.
    pub fn tick<R, A>(
        &mut self,
        validity: Validity,
        hints: &[Hint],
        now: Instant,
        rng: &mut R,
        actuator: &mut A,
    ) -> Action
    where
        R: Rng + ?Sized,
        A: PointerActuator + ?Sized,
    {
        match validity {
            Validity::Loading => {
                debug!("board mostly unknown, waiting");
                return Action::Wait;
            }
            Validity::Unreliable => return self.dismiss(now, rng, actuator),
            Validity::Trusted => {}
        }
        self.last_dismiss = None;

        if let AutoplayState::HalfMoveDone(pending) = self.state {
            self.state = AutoplayState::Idle;
            let at = self.to_screen(pending.point_to);
            debug!(%at, "finishing pending move");
            actuator.click(at);
            return Action::FinishMove(at);
        }

        if hints.is_empty() {
            return self.explore(rng, actuator);
        }

        // a lone hint is committed over two ticks like the preferred best move
        if self.config.prefer_best_move || hints.len() == 1 {
            let hint = hints[0];
            let at = self.to_screen(hint.point_from);
            debug!(%at, count = hint.count, "starting move, second click next tick");
            actuator.click(at);
            self.state = AutoplayState::HalfMoveDone(hint);
            return Action::StartMove(at);
        }

        let hint = hints[rng.gen_range(0..hints.len())];
        let from = self.to_screen(hint.point_from);
        let to = self.to_screen(hint.point_to);
        debug!(%from, %to, count = hint.count, "swapping random hint");
        actuator.click(from);
        actuator.click(to);
        Action::Swap(from, to)
    }

    fn to_screen(&self, image_point: Point) -> Point {
        self.config.capture_region.to_screen(image_point)
    }

    fn dismiss<R, A>(&mut self, now: Instant, rng: &mut R, actuator: &mut A) -> Action
    where
        R: Rng + ?Sized,
        A: PointerActuator + ?Sized,
    {
        if let Some(last) = self.last_dismiss {
            if now.saturating_duration_since(last) < self.config.dismiss_interval {
                return Action::Throttled;
            }
        }
        let jitter = i32::try_from(self.config.dismiss_jitter).unwrap_or(i32::MAX);
        let (jx, jy) = if jitter > 0 {
            (rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
        } else {
            (0, 0)
        };
        let at = self.to_screen(self.config.dismiss_offset) + Point::new(jx, jy);
        info!(%at, "board partly unknown, clicking to dismiss");
        actuator.click(at);
        self.last_dismiss = Some(now);
        Action::Dismiss(at)
    }

    fn explore<R, A>(&mut self, rng: &mut R, actuator: &mut A) -> Action
    where
        R: Rng + ?Sized,
        A: PointerActuator + ?Sized,
    {
        let region = self.config.capture_region;
        if region.size().is_empty() {
            return Action::Wait;
        }
        let offset = Point::new(
            rng.gen_range(0..region.width) as i32,
            rng.gen_range(0..region.height) as i32,
        );
        let at = self.to_screen(offset);
        debug!(%at, "no hints, clicking at random");
        actuator.click(at);
        Action::Explore(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::hinter::HintEngine;
    use crate::utils::board_from_str_array;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const REGION: Rect = Rect::new(100, 200, 300, 300);

    fn controller(prefer_best_move: bool) -> AutoplayController {
        AutoplayController::new(AutoplayConfig {
            invalid_threshold: 10,
            prefer_best_move,
            capture_region: REGION,
            dismiss_offset: Point::new(150, 250),
            dismiss_jitter: 4,
            dismiss_interval: Duration::from_millis(400),
        })
    }

    fn hints_for(rows: &[&str]) -> Vec<Hint> {
        let board = board_from_str_array(rows).unwrap();
        HintEngine::default()
            .process(&board, REGION.size(), false, &mut StepRng::new(u64::MAX, 0))
            .ranked()
            .to_vec()
    }

    fn on_screen(p: Point) -> Point {
        REGION.to_screen(p)
    }

    #[test]
    fn test_assess_thresholds() {
        let ctl = controller(false);
        let trusted = board_from_str_array(&["0123456789"; 10]).unwrap();
        assert_eq!(ctl.assess(&trusted), Validity::Trusted);

        // 9 of 100 unknown: still under 10%
        let mut rows = vec!["0123456789"; 10];
        rows[0] = "?????????9";
        assert_eq!(ctl.assess(&board_from_str_array(&rows).unwrap()), Validity::Trusted);

        rows[0] = "??????????";
        assert_eq!(ctl.assess(&board_from_str_array(&rows).unwrap()), Validity::Unreliable);

        let half = ["??????????"; 5]
            .into_iter()
            .chain(["0123456789"; 5])
            .collect::<Vec<_>>();
        assert_eq!(ctl.assess(&board_from_str_array(&half).unwrap()), Validity::Unreliable);

        let mostly = ["??????????"; 6]
            .into_iter()
            .chain(["0123456789"; 4])
            .collect::<Vec<_>>();
        assert_eq!(ctl.assess(&board_from_str_array(&mostly).unwrap()), Validity::Loading);
    }

    #[test]
    fn test_single_hint_without_preference_commits_over_two_ticks() {
        // A lone hint is a half move even with prefer_best_move off: the
        // decision procedure commits to "the best or only move" over two
        // ticks (see "Lone hint" under open question decisions in DESIGN.md).
        let hints = hints_for(&["0010"]);
        assert_eq!(hints.len(), 1);
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let now = Instant::now();

        let action = ctl.tick(Validity::Trusted, &hints, now, &mut rng, &mut clicks);
        assert_eq!(action, Action::StartMove(on_screen(hints[0].point_from)));
        assert_eq!(clicks.take(), vec![on_screen(hints[0].point_from)]);
        assert_eq!(ctl.state(), &AutoplayState::HalfMoveDone(hints[0]));

        let action = ctl.tick(Validity::Trusted, &hints, now, &mut rng, &mut clicks);
        assert_eq!(action, Action::FinishMove(on_screen(hints[0].point_to)));
        assert_eq!(clicks.take(), vec![on_screen(hints[0].point_to)]);
        assert_eq!(ctl.state(), &AutoplayState::Idle);
    }

    #[test]
    fn test_random_pick_clicks_both_points_and_stays_idle() {
        let hints = hints_for(&["001", "110"]);
        assert_eq!(hints.len(), 2);
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();

        // StepRng(0, 0) picks index 0
        let mut rng = StepRng::new(0, 0);
        let action = ctl.tick(Validity::Trusted, &hints, Instant::now(), &mut rng, &mut clicks);
        let from = on_screen(hints[0].point_from);
        let to = on_screen(hints[0].point_to);
        assert_eq!(action, Action::Swap(from, to));
        assert_eq!(clicks.take(), vec![from, to]);
        assert_eq!(ctl.state(), &AutoplayState::Idle);
    }

    #[test]
    fn test_random_pick_uses_any_hint() {
        let hints = hints_for(&["00100", "11011", "01234"]);
        assert!(hints.len() > 2);
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            match ctl.tick(Validity::Trusted, &hints, Instant::now(), &mut rng, &mut clicks) {
                Action::Swap(from, to) => assert!(hints
                    .iter()
                    .any(|h| on_screen(h.point_from) == from && on_screen(h.point_to) == to)),
                other => panic!("unexpected action {:?}", other),
            }
            assert_eq!(ctl.state(), &AutoplayState::Idle);
        }
    }

    #[test]
    fn test_prefer_best_move_splits_across_ticks() {
        let hints = hints_for(&["00100", "11011", "01234"]);
        assert!(hints.len() >= 3);
        let mut ctl = controller(true);
        let mut clicks = RecordingActuator::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let start = Instant::now();

        let first = ctl.tick(Validity::Trusted, &hints, start, &mut rng, &mut clicks);
        assert_eq!(first, Action::StartMove(on_screen(hints[0].point_from)));
        assert_eq!(clicks.take(), vec![on_screen(hints[0].point_from)]);
        assert!(matches!(ctl.state(), AutoplayState::HalfMoveDone(_)));

        // next tick sees a completely different board
        let other = hints_for(&["0010"]);
        let second = ctl.tick(
            Validity::Trusted,
            &other,
            start + Duration::from_millis(200),
            &mut rng,
            &mut clicks,
        );
        assert_eq!(second, Action::FinishMove(on_screen(hints[0].point_to)));
        assert_eq!(clicks.take(), vec![on_screen(hints[0].point_to)]);
        assert_eq!(ctl.state(), &AutoplayState::Idle);
    }

    #[test]
    fn test_pending_move_finishes_even_without_hints() {
        let hints = hints_for(&["0010"]);
        let mut ctl = controller(true);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        ctl.tick(Validity::Trusted, &hints, Instant::now(), &mut rng, &mut clicks);
        clicks.take();

        let action = ctl.tick(Validity::Trusted, &[], Instant::now(), &mut rng, &mut clicks);
        assert_eq!(action, Action::FinishMove(on_screen(hints[0].point_to)));
        assert_eq!(clicks.clicks.len(), 1);
    }

    #[test]
    fn test_untrusted_ticks_keep_pending_move() {
        let hints = hints_for(&["0010"]);
        let mut ctl = controller(true);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let start = Instant::now();
        ctl.tick(Validity::Trusted, &hints, start, &mut rng, &mut clicks);
        clicks.take();

        assert_eq!(
            ctl.tick(Validity::Loading, &hints, start, &mut rng, &mut clicks),
            Action::Wait
        );
        assert!(matches!(
            ctl.tick(Validity::Unreliable, &hints, start, &mut rng, &mut clicks),
            Action::Dismiss(_)
        ));
        assert_eq!(ctl.state(), &AutoplayState::HalfMoveDone(hints[0]));

        let action = ctl.tick(Validity::Trusted, &hints, start, &mut rng, &mut clicks);
        assert_eq!(action, Action::FinishMove(on_screen(hints[0].point_to)));
    }

    #[test]
    fn test_loading_screen_takes_no_action() {
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let action = ctl.tick(Validity::Loading, &[], Instant::now(), &mut rng, &mut clicks);
        assert_eq!(action, Action::Wait);
        assert!(clicks.clicks.is_empty());
    }

    #[test]
    fn test_dismissal_is_throttled() {
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let start = Instant::now();

        let first = ctl.tick(Validity::Unreliable, &[], start, &mut rng, &mut clicks);
        let second = ctl.tick(
            Validity::Unreliable,
            &[],
            start + Duration::from_millis(150),
            &mut rng,
            &mut clicks,
        );
        // jitter draws the low end of -4..=4
        assert_eq!(first, Action::Dismiss(Point::new(100 + 150 - 4, 200 + 250 - 4)));
        assert_eq!(second, Action::Throttled);
        assert_eq!(clicks.clicks.len(), 1);

        let third = ctl.tick(
            Validity::Unreliable,
            &[],
            start + Duration::from_millis(400),
            &mut rng,
            &mut clicks,
        );
        assert!(matches!(third, Action::Dismiss(_)));
        assert_eq!(clicks.clicks.len(), 2);
    }

    #[test]
    fn test_dismissal_saturates_at_screen_limits() {
        let mut ctl = AutoplayController::new(AutoplayConfig {
            capture_region: REGION,
            dismiss_offset: Point::new(i32::MAX, i32::MAX),
            dismiss_jitter: u32::MAX,
            ..AutoplayConfig::default()
        });
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        // offset saturates to i32::MAX, then the jitter draws -i32::MAX
        let action = ctl.tick(Validity::Unreliable, &[], Instant::now(), &mut rng, &mut clicks);
        assert_eq!(action, Action::Dismiss(Point::new(0, 0)));
        assert_eq!(clicks.clicks.len(), 1);
    }

    #[test]
    fn test_dismissal_jitter_stays_in_bounds() {
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let start = Instant::now();
        for i in 0..50 {
            let now = start + Duration::from_millis(400 * i);
            ctl.tick(Validity::Unreliable, &[], now, &mut rng, &mut clicks);
        }
        assert_eq!(clicks.clicks.len(), 50);
        for at in clicks.clicks {
            assert!((246..=254).contains(&at.x), "x {}", at.x);
            assert!((446..=454).contains(&at.y), "y {}", at.y);
        }
    }

    #[test]
    fn test_trusted_board_resets_dismissal_throttle() {
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let start = Instant::now();

        ctl.tick(Validity::Unreliable, &[], start, &mut rng, &mut clicks);
        ctl.tick(Validity::Trusted, &[], start + Duration::from_millis(50), &mut rng, &mut clicks);
        let again = ctl.tick(
            Validity::Unreliable,
            &[],
            start + Duration::from_millis(100),
            &mut rng,
            &mut clicks,
        );
        assert!(matches!(again, Action::Dismiss(_)));
    }

    #[test]
    fn test_no_hints_clicks_inside_region() {
        let mut ctl = controller(false);
        let mut clicks = RecordingActuator::new();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let action = ctl.tick(Validity::Trusted, &[], Instant::now(), &mut rng, &mut clicks);
            assert!(matches!(action, Action::Explore(_)));
            assert_eq!(ctl.state(), &AutoplayState::Idle);
        }
        assert_eq!(clicks.clicks.len(), 100);
        assert!(clicks.clicks.iter().all(|&p| REGION.contains(p)));
    }

    #[test]
    fn test_no_hints_with_empty_region_waits() {
        let mut ctl = AutoplayController::new(AutoplayConfig {
            capture_region: Rect::new(10, 10, 0, 50),
            ..AutoplayConfig::default()
        });
        let mut clicks = RecordingActuator::new();
        let mut rng = StepRng::new(0, 0);
        let action = ctl.tick(Validity::Trusted, &[], Instant::now(), &mut rng, &mut clicks);
        assert_eq!(action, Action::Wait);
        assert!(clicks.clicks.is_empty());
    }

    #[test]
    fn test_action_click_counts() {
        let p = Point::new(1, 2);
        assert_eq!(Action::Wait.clicks(), 0);
        assert_eq!(Action::Throttled.clicks(), 0);
        assert_eq!(Action::StartMove(p).clicks(), 1);
        assert_eq!(Action::Swap(p, p).clicks(), 2);
    }

    #[test]
    fn test_hint_points_use_image_size() {
        let hints = hints_for(&["0010"]);
        let board = board_from_str_array(&["0010"]).unwrap();
        assert_eq!(board.width(), 4);
        // 300px wide image, 4 columns: cell 3 centre is 262
        assert_eq!(hints[0].point_from, Point::new(262, 150));
        assert_eq!(REGION.size(), Size::new(300, 300));
    }
}
