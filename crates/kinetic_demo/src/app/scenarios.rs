use std::cell::RefCell;
use std::rc::Rc;

use clap::ValueEnum;
use kinetic::{
    Action, ActionError, ActionFloat, Bezier, BezierConfig, Blink, BoxedAction, Color3, DelayTime,
    Fade, Instant, Jump, Move, Node, Repeat, RepeatForever, Rotate, Scale, Sequence, Skew, Spawn,
    Tint, Vec2,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ScenarioKind {
    /// A satellite circling a square path forever, plus a spinner.
    Orbit,
    /// A beacon fading and swelling three times.
    Pulse,
    /// A ball hopping along the x axis, then turning red.
    Bounce,
    /// Every action family on two nodes.
    Showcase,
}

impl ScenarioKind {
    pub(crate) const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Orbit,
        ScenarioKind::Pulse,
        ScenarioKind::Bounce,
        ScenarioKind::Showcase,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            ScenarioKind::Orbit => "orbit",
            ScenarioKind::Pulse => "pulse",
            ScenarioKind::Bounce => "bounce",
            ScenarioKind::Showcase => "showcase",
        }
    }

    pub(crate) fn build(self) -> Result<Scenario, ActionError> {
        match self {
            ScenarioKind::Orbit => orbit(),
            ScenarioKind::Pulse => pulse(),
            ScenarioKind::Bounce => bounce(),
            ScenarioKind::Showcase => showcase(),
        }
    }
}

struct Track {
    node: Rc<RefCell<Node>>,
    root: BoxedAction,
}

/// A set of nodes, each driven by its own root action.
pub(crate) struct Scenario {
    tracks: Vec<Track>,
}

impl Scenario {
    fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    fn with_track(mut self, node: Node, root: BoxedAction) -> Self {
        self.tracks.push(Track {
            node: node.into_shared(),
            root,
        });
        self
    }

    pub(crate) fn start(&mut self) {
        for track in &mut self.tracks {
            track.root.start_with_target(track.node.clone());
        }
    }

    /// Steps every root that has not finished yet.
    pub(crate) fn step(&mut self, dt: f32) {
        for track in &mut self.tracks {
            if !track.root.is_done() {
                track.root.step(dt);
            }
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.tracks.iter().all(|track| track.root.is_done())
    }

    pub(crate) fn stop(&mut self) {
        for track in &mut self.tracks {
            track.root.stop();
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Node> {
        self.tracks
            .iter()
            .map(|track| track.node.borrow().clone())
            .collect()
    }
}

fn boxed(action: impl Action + 'static) -> BoxedAction {
    Box::new(action)
}

fn orbit() -> Result<Scenario, ActionError> {
    let side = 100.0;
    let square = Sequence::from_actions([
        boxed(Move::by(0.5, Vec2::new(0.0, side))?),
        boxed(Move::by(0.5, Vec2::new(-side, 0.0))?),
        boxed(Move::by(0.5, Vec2::new(0.0, -side))?),
        boxed(Move::by(0.5, Vec2::new(side, 0.0))?),
    ])?;
    let spin = Rotate::by(1.0, 90.0)?;

    Ok(Scenario::new()
        .with_track(
            Node::named("satellite").at(Vec2::new(side, 0.0)),
            boxed(RepeatForever::new(boxed(square))),
        )
        .with_track(Node::named("spinner"), boxed(RepeatForever::new(boxed(spin)))))
}

fn pulse() -> Result<Scenario, ActionError> {
    let swell = Spawn::new(boxed(Fade::fade_out(0.5)?), boxed(Scale::to(0.5, 1.5)?));
    let settle = Spawn::new(boxed(Fade::fade_in(0.5)?), boxed(Scale::to(0.5, 1.0)?));
    let beat = Sequence::new(boxed(swell), boxed(settle));

    let halo = Spawn::new(
        boxed(Rotate::by(3.0, 360.0)?),
        boxed(Tint::by(3.0, -55, 0, -55)?),
    );

    Ok(Scenario::new()
        .with_track(Node::named("beacon"), boxed(Repeat::new(boxed(beat), 3)))
        .with_track(Node::named("halo"), boxed(halo)))
}

fn bounce() -> Result<Scenario, ActionError> {
    let hops = Repeat::new(boxed(Jump::by(0.5, Vec2::new(40.0, 0.0), 30.0, 2)?), 4);
    let blush = Tint::to(0.25, Color3::new(255, 64, 64))?;

    Ok(Scenario::new().with_track(
        Node::named("ball"),
        boxed(Sequence::new(boxed(hops), boxed(blush))),
    ))
}

fn showcase() -> Result<Scenario, ActionError> {
    let arc = BezierConfig {
        end: Vec2::new(60.0, 0.0),
        control_1: Vec2::new(0.0, 50.0),
        control_2: Vec2::new(60.0, 50.0),
    };
    let tour = Sequence::from_actions([
        boxed(Instant::hide()),
        boxed(Instant::place(Vec2::new(-20.0, 0.0))),
        boxed(Instant::show()),
        boxed(Spawn::from_actions([
            boxed(Move::to(0.5, Vec2::new(40.0, 20.0))?),
            boxed(Rotate::to(0.5, 180.0)?),
            boxed(Skew::by(0.5, Vec2::new(10.0, 0.0))?),
        ])?),
        boxed(Bezier::by(0.75, arc)?),
        boxed(Jump::to(0.5, Vec2::ZERO, 20.0, 1)?),
        boxed(Blink::new(0.5, 3)?),
        boxed(Tint::by(0.25, -100, 0, 0)?),
        boxed(Scale::by_xy(0.25, Vec2::new(2.0, 2.0))?),
        boxed(ActionFloat::new(0.5, 0.0, 1.0, |progress| {
            debug!(progress, "showcase_progress");
        })?),
        boxed(DelayTime::new(0.25)?),
        boxed(Instant::call(|target| {
            debug!(opacity = target.opacity(), "showcase_tour_finished");
        })),
    ])?;

    let outbound = Sequence::from_actions([
        boxed(Move::by(0.5, Vec2::new(30.0, 30.0))?),
        boxed(Rotate::by(0.5, 45.0)?),
        boxed(Scale::by(0.5, 2.0)?),
        boxed(Fade::fade_out(0.5)?),
    ])?;
    let inbound = outbound
        .reverse()
        .unwrap_or_else(|| outbound.clone_action());
    let mirror = Sequence::new(boxed(outbound), inbound);

    Ok(Scenario::new()
        .with_track(Node::named("hero"), boxed(tour))
        .with_track(Node::named("mirror"), boxed(mirror)))
}
