//! Shared entity model
//!
//! Everything a viewer mirrors from the shared store lives here. Each
//! top-level field of `SharedState` is replaced wholesale by a `FieldUpdate`;
//! nothing is ever merged.

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Opaque identity of a session member (0 = nobody)
pub type MemberId = u64;

/// `MemberId` of an unoccupied slot
pub const NO_MEMBER: MemberId = 0;

/// Which seat / paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Store field holding this side's player slot
    pub fn player_field(self) -> Field {
        match self {
            Side::Left => Field::LeftPlayer,
            Side::Right => Field::RightPlayer,
        }
    }

    /// Store field holding this side's paddle
    pub fn paddle_field(self) -> Field {
        match self {
            Side::Left => Field::LeftPaddle,
            Side::Right => Field::RightPaddle,
        }
    }
}

/// Seat assignment record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    pub member_id: MemberId,
    /// Logical timestamp of the claim (0 when vacant)
    pub t: f64,
}

impl PlayerSlot {
    pub fn vacant() -> Self {
        Self {
            member_id: NO_MEMBER,
            t: 0.0,
        }
    }

    pub fn occupied_by(member_id: MemberId, t: f64) -> Self {
        Self { member_id, t }
    }

    pub fn is_occupied(&self) -> bool {
        self.member_id != NO_MEMBER
    }
}

/// A paddle; `y` is the top edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    /// Vertical velocity (units per tick)
    pub dy: f32,
    pub t: f64,
}

impl Paddle {
    /// Paddle at its starting position, vertically centered
    pub fn new(side: Side, t: f64) -> Self {
        let x = match side {
            Side::Left => GRID * 2.0,
            Side::Right => CANVAS_WIDTH - GRID * 3.0,
        };
        Self {
            x,
            y: CANVAS_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
            dy: 0.0,
            t,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    /// Advance by one tick and keep the paddle between the walls
    pub fn integrate(&mut self) {
        self.y += self.dy;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        if self.y < MIN_PADDLE_Y {
            self.y = MIN_PADDLE_Y;
        } else if self.y > MAX_PADDLE_Y {
            self.y = MAX_PADDLE_Y;
        }
    }

    /// Copy of this paddle with a new velocity, as published on input
    pub fn with_velocity(&self, dy: f32, t: f64) -> Self {
        Self { dy, t, ..*self }
    }
}

/// The ball; `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    /// Latched while a relaunch is pending; position is frozen meanwhile
    pub resetting: bool,
    pub dx: f32,
    pub dy: f32,
    #[serde(default)]
    pub t: f64,
}

impl Default for Ball {
    fn default() -> Self {
        let (x, y) = Self::center();
        Self {
            x,
            y,
            resetting: false,
            dx: BALL_SPEED,
            dy: -BALL_SPEED,
            t: 0.0,
        }
    }
}

impl Ball {
    /// Relaunch point
    pub fn center() -> (f32, f32) {
        (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BALL_SIZE, BALL_SIZE)
    }

    /// Ball has left the arena horizontally (a point was scored)
    pub fn is_out(&self) -> bool {
        self.x < 0.0 || self.x > CANVAS_WIDTH
    }
}

/// Name of one independently updatable field of the shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    LeftPlayer,
    RightPlayer,
    LeftPaddle,
    RightPaddle,
    Ball,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::LeftPlayer => "leftPlayer",
            Field::RightPlayer => "rightPlayer",
            Field::LeftPaddle => "leftPaddle",
            Field::RightPaddle => "rightPaddle",
            Field::Ball => "ball",
        }
    }
}

/// Whole-field replacement carried between viewers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    LeftPlayer(PlayerSlot),
    RightPlayer(PlayerSlot),
    LeftPaddle(Paddle),
    RightPaddle(Paddle),
    Ball(Ball),
}

impl FieldUpdate {
    pub fn player(side: Side, slot: PlayerSlot) -> Self {
        match side {
            Side::Left => FieldUpdate::LeftPlayer(slot),
            Side::Right => FieldUpdate::RightPlayer(slot),
        }
    }

    pub fn paddle(side: Side, paddle: Paddle) -> Self {
        match side {
            Side::Left => FieldUpdate::LeftPaddle(paddle),
            Side::Right => FieldUpdate::RightPaddle(paddle),
        }
    }

    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::LeftPlayer(_) => Field::LeftPlayer,
            FieldUpdate::RightPlayer(_) => Field::RightPlayer,
            FieldUpdate::LeftPaddle(_) => Field::LeftPaddle,
            FieldUpdate::RightPaddle(_) => Field::RightPaddle,
            FieldUpdate::Ball(_) => Field::Ball,
        }
    }
}

/// Partial snapshot as persisted by the shared store
///
/// Fields nobody has written yet are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_player: Option<PlayerSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_player: Option<PlayerSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_paddle: Option<Paddle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_paddle: Option<Paddle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball: Option<Ball>,
}

impl Attributes {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Replace the field named by `update`
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::LeftPlayer(v) => self.left_player = Some(v),
            FieldUpdate::RightPlayer(v) => self.right_player = Some(v),
            FieldUpdate::LeftPaddle(v) => self.left_paddle = Some(v),
            FieldUpdate::RightPaddle(v) => self.right_paddle = Some(v),
            FieldUpdate::Ball(v) => self.ball = Some(v),
        }
    }
}

/// Complete shared simulation state as mirrored by one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    pub left_player: PlayerSlot,
    pub right_player: PlayerSlot,
    pub left_paddle: Paddle,
    pub right_paddle: Paddle,
    pub ball: Ball,
}

impl SharedState {
    /// Fresh state for a new session; paddles are stamped with `clock`
    pub fn new(clock: f64) -> Self {
        Self::hydrate(Attributes::default(), clock)
    }

    /// Build the mirror from a persisted snapshot, filling missing fields
    /// with their defaults
    pub fn hydrate(attrs: Attributes, clock: f64) -> Self {
        Self {
            left_player: attrs.left_player.unwrap_or_default(),
            right_player: attrs.right_player.unwrap_or_default(),
            left_paddle: attrs
                .left_paddle
                .unwrap_or_else(|| Paddle::new(Side::Left, clock)),
            right_paddle: attrs
                .right_paddle
                .unwrap_or_else(|| Paddle::new(Side::Right, clock)),
            ball: attrs.ball.unwrap_or_default(),
        }
    }

    pub fn player(&self, side: Side) -> &PlayerSlot {
        match side {
            Side::Left => &self.left_player,
            Side::Right => &self.right_player,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerSlot {
        match side {
            Side::Left => &mut self.left_player,
            Side::Right => &mut self.right_player,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left_paddle,
            Side::Right => &self.right_paddle,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left_paddle,
            Side::Right => &mut self.right_paddle,
        }
    }

    /// Overwrite one field with a received (or locally produced) value
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::LeftPlayer(v) => self.left_player = v,
            FieldUpdate::RightPlayer(v) => self.right_player = v,
            FieldUpdate::LeftPaddle(v) => self.left_paddle = v,
            FieldUpdate::RightPaddle(v) => self.right_paddle = v,
            FieldUpdate::Ball(v) => self.ball = v,
        }
    }

    /// Current value of `field`, packaged for publishing
    pub fn snapshot_field(&self, field: Field) -> FieldUpdate {
        match field {
            Field::LeftPlayer => FieldUpdate::LeftPlayer(self.left_player),
            Field::RightPlayer => FieldUpdate::RightPlayer(self.right_player),
            Field::LeftPaddle => FieldUpdate::LeftPaddle(self.left_paddle),
            Field::RightPaddle => FieldUpdate::RightPaddle(self.right_paddle),
            Field::Ball => FieldUpdate::Ball(self.ball),
        }
    }

    /// Both seats are taken, so physics may run
    pub fn both_seated(&self) -> bool {
        self.left_player.is_occupied() && self.right_player.is_occupied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = SharedState::new(1234.0);
        assert_eq!(state.left_player, PlayerSlot::vacant());
        assert_eq!(state.left_paddle.x, 30.0);
        assert_eq!(state.right_paddle.x, 705.0);
        assert_eq!(state.left_paddle.y, 255.0);
        assert_eq!(state.left_paddle.t, 1234.0);
        assert_eq!(state.ball.x, 375.0);
        assert_eq!(state.ball.y, 292.5);
        assert_eq!(state.ball.dx, BALL_SPEED);
        assert_eq!(state.ball.dy, -BALL_SPEED);
        assert!(!state.ball.resetting);
    }

    #[test]
    fn test_hydrate_from_persisted_json() {
        let json = r#"{
            "leftPlayer": {"memberId": 42, "t": 10},
            "ball": {"x": 100, "y": 200, "resetting": false, "dx": -5, "dy": 5}
        }"#;
        let attrs = Attributes::from_json(json).expect("valid snapshot");
        let state = SharedState::hydrate(attrs, 7.0);

        assert_eq!(state.left_player.member_id, 42);
        assert!(!state.right_player.is_occupied());
        assert_eq!(state.ball.x, 100.0);
        assert_eq!(state.ball.dx, -5.0);
        // Ball without a timestamp defaults to 0
        assert_eq!(state.ball.t, 0.0);
        // Missing paddles get defaults stamped with the join clock
        assert_eq!(state.right_paddle.t, 7.0);
    }

    #[test]
    fn test_field_update_wire_shape() {
        let update = FieldUpdate::player(Side::Right, PlayerSlot::occupied_by(9, 3.0));
        let json = serde_json::to_value(update).expect("serializable");
        assert_eq!(json["field"], "rightPlayer");
        assert_eq!(json["value"]["memberId"], 9);
    }

    #[test]
    fn test_apply_replaces_single_field() {
        let mut state = SharedState::new(0.0);
        let before = state.clone();
        let paddle = Paddle {
            x: 30.0,
            y: 100.0,
            dy: -6.0,
            t: 5.0,
        };
        state.apply(FieldUpdate::LeftPaddle(paddle));

        assert_eq!(state.left_paddle, paddle);
        assert_eq!(state.right_paddle, before.right_paddle);
        assert_eq!(state.ball, before.ball);
        assert_eq!(
            state.snapshot_field(Field::LeftPaddle),
            FieldUpdate::LeftPaddle(paddle)
        );
    }

    #[test]
    fn test_attributes_skip_unwritten_fields() {
        let mut attrs = Attributes::default();
        attrs.apply(FieldUpdate::Ball(Ball::default()));
        let json = attrs.to_json().expect("serializable");
        assert!(json.contains("\"ball\""));
        assert!(!json.contains("leftPlayer"));
    }
}
