#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake Escape engine.
//!
//! This crate defines the plain data records that connect the generation
//! systems, the prefetch pipeline, and external game controllers. Layouts are
//! produced by the generator, validated by the solvability oracle, and handed
//! across thread boundaries as serializable values with no behaviour
//! attached. Rendering, input, audio, and persistence live entirely outside
//! this workspace and reference these records by value or by [`SnakeId`].

use serde::{Deserialize, Serialize};

/// Extra moves granted on top of one activation per snake.
///
/// Controllers set the player's move allowance to `snake count + 2`; the
/// slack is a fixed tuning value, not derived from the layout.
pub const MOVE_ALLOWANCE_SLACK: u32 = 2;

/// Rank titles awarded by total rescued-snake count, lowest threshold first.
const RANK_TITLES: [(u32, &str); 6] = [
    (0, "NOVICE"),
    (10, "SNAKE CHARMER"),
    (30, "PUZZLE SOLVER"),
    (60, "SERPENT MASTER"),
    (100, "VIPER LEGEND"),
    (200, "SNAKE GOD"),
];

/// Returns the rank title earned after rescuing the provided number of snakes.
#[must_use]
pub fn rank_title(snakes_rescued: u32) -> &'static str {
    let mut title = RANK_TITLES[0].1;
    for (threshold, name) in RANK_TITLES {
        if snakes_rescued >= threshold {
            title = name;
        }
    }
    title
}

/// Stars awarded for clearing a level in the given number of moves.
///
/// Three stars for one move per snake, two for a single wasted move, one
/// otherwise.
#[must_use]
pub const fn star_rating(moves_taken: u32, snake_count: u32) -> u32 {
    if moves_taken <= snake_count {
        3
    } else if moves_taken <= snake_count + 1 {
        2
    } else {
        1
    }
}

/// Experience points granted for a cleared level.
///
/// Challenge levels pay out four times the base reward.
#[must_use]
pub const fn reward_xp(stars: u32, challenge: bool) -> u32 {
    let base = stars * 100;
    if challenge {
        base * 4
    } else {
        base
    }
}

/// Travel and growth directions available on the grid.
///
/// The declaration order fixes the indices 0-3 used for serialization and for
/// quarter-turn arithmetic during body growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit delta applied to a cell when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Small stable index used when crossing serialization boundaries.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Resolves a direction from its stable index.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Direction after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Right => Self::Up,
            Self::Down => Self::Right,
            Self::Left => Self::Down,
        }
    }

    /// Direction after a quarter turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the caller's concern via [`GridSize::contains`].
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

/// Side length of the square playing grid, measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(side: u32) -> Self {
        Self(side)
    }

    /// Number of cells along one edge of the grid.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.0.saturating_mul(self.0)
    }

    /// Reports whether the provided cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.0 && cell.y() < self.0
    }
}

/// Positive level number presented to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Creates a new level index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a snake, scoped to a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnakeId(u32);

impl SnakeId {
    /// Creates a new snake identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cosmetic appearance applied to a snake; irrelevant to solvability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnakeColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl SnakeColor {
    /// Creates a new snake color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Plain data record describing a single snake on the board.
///
/// Cells are ordered head first. Rendering and animation wrappers owned by
/// adapters reference this record by [`SnakeId`]; the record itself carries
/// no drawing capability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    /// Identifier unique within the level.
    pub id: SnakeId,
    /// Cells occupied by the snake, head first, body trailing.
    pub cells: Vec<CellCoord>,
    /// Direction the head points and will slide toward when activated.
    pub direction: Direction,
    /// Cosmetic color tag.
    pub color: SnakeColor,
}

impl Snake {
    /// Creates a new snake record from its parts.
    #[must_use]
    pub fn new(
        id: SnakeId,
        cells: Vec<CellCoord>,
        direction: Direction,
        color: SnakeColor,
    ) -> Self {
        Self {
            id,
            cells,
            direction,
            color,
        }
    }

    /// Head cell of the snake, if the record is non-empty.
    #[must_use]
    pub fn head(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Reports whether the cells form a valid body: pairwise distinct and
    /// each consecutive pair grid-adjacent.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        for window in self.cells.windows(2) {
            if window[0].manhattan_distance(window[1]) != 1 {
                return false;
            }
        }
        for (index, cell) in self.cells.iter().enumerate() {
            if self.cells[index + 1..].contains(cell) {
                return false;
            }
        }
        !self.cells.is_empty()
    }
}

/// Immovable single-cell blocker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    cell: CellCoord,
}

impl Obstacle {
    /// Creates a new obstacle occupying the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord) -> Self {
        Self { cell }
    }

    /// Creates a new obstacle at the provided column and row.
    #[must_use]
    pub const fn at(x: u32, y: u32) -> Self {
        Self {
            cell: CellCoord::new(x, y),
        }
    }

    /// Cell occupied by the obstacle.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Generation parameters derived from a level index.
///
/// Pure output of the difficulty profiler; no persisted state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Side length of the square grid for this level.
    pub grid: GridSize,
    /// Minimum snake length sampled during placement.
    pub min_len: u32,
    /// Maximum snake length sampled during placement.
    pub max_len: u32,
    /// Probability of a quarter turn at each body-growth step.
    pub turn_chance: f64,
    /// Number of obstacles the generator attempts to place.
    pub obstacles: u32,
    /// Extra-move cushion granted to the player on top of the strict limit.
    pub move_buffer: u32,
    /// Marks every fourth level, which uses a harder perturbation and a
    /// distinct cosmetic palette.
    pub challenge: bool,
}

/// Validated output of the level generator for one level index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Level index this layout was generated for.
    pub level: LevelIndex,
    /// Side length of the square grid.
    pub grid: GridSize,
    /// Snakes placed on the board.
    pub snakes: Vec<Snake>,
    /// Obstacles placed on the board.
    pub obstacles: Vec<Obstacle>,
    /// Whether this is a challenge level.
    pub challenge: bool,
    /// Move-buffer value carried over from the difficulty profile.
    pub move_buffer: u32,
}

impl LevelLayout {
    /// Move allowance the controller grants the player for this layout.
    ///
    /// Always `snake count + 2`: clearing takes exactly one move per snake,
    /// so the slack is a fixed two moves regardless of difficulty.
    #[must_use]
    pub fn move_allowance(&self) -> u32 {
        self.snakes.len() as u32 + MOVE_ALLOWANCE_SLACK
    }

    /// Number of grid cells covered by snakes and obstacles.
    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        let snake_cells: usize = self.snakes.iter().map(|snake| snake.cells.len()).sum();
        snake_cells + self.obstacles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        rank_title, reward_xp, star_rating, CellCoord, Direction, GridSize, LevelIndex,
        LevelLayout, Obstacle, Snake, SnakeColor, SnakeId,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn stepping_off_the_quadrant_returns_none() {
        assert_eq!(CellCoord::new(0, 3).stepped(Direction::Left), None);
        assert_eq!(CellCoord::new(3, 0).stepped(Direction::Up), None);
        assert_eq!(
            CellCoord::new(3, 0).stepped(Direction::Right),
            Some(CellCoord::new(4, 0))
        );
    }

    #[test]
    fn quarter_turns_cycle_through_all_directions() {
        assert_eq!(Direction::Up.turned_right(), Direction::Right);
        assert_eq!(Direction::Up.turned_left(), Direction::Left);
        assert_eq!(Direction::Left.turned_right(), Direction::Up);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        for direction in Direction::ALL {
            assert_eq!(direction.turned_left().turned_right(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn direction_indices_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_index(direction.index()), Some(direction));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn grid_size_bounds_cells() {
        let grid = GridSize::new(5);
        assert_eq!(grid.cell_count(), 25);
        assert!(grid.contains(CellCoord::new(4, 4)));
        assert!(!grid.contains(CellCoord::new(5, 0)));
        assert!(!grid.contains(CellCoord::new(0, 5)));
    }

    #[test]
    fn contiguity_rejects_gaps_and_duplicates() {
        let color = SnakeColor::from_rgb(0, 0, 0);
        let gapped = Snake::new(
            SnakeId::new(0),
            vec![CellCoord::new(0, 0), CellCoord::new(2, 0)],
            Direction::Right,
            color,
        );
        assert!(!gapped.is_contiguous());

        let folded = Snake::new(
            SnakeId::new(1),
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 0),
            ],
            Direction::Right,
            color,
        );
        assert!(!folded.is_contiguous());

        let valid = Snake::new(
            SnakeId::new(2),
            vec![
                CellCoord::new(2, 2),
                CellCoord::new(2, 3),
                CellCoord::new(1, 3),
            ],
            Direction::Up,
            color,
        );
        assert!(valid.is_contiguous());
        assert_eq!(valid.head(), Some(CellCoord::new(2, 2)));
    }

    #[test]
    fn move_allowance_is_snake_count_plus_two() {
        let layout = sample_layout();
        assert_eq!(layout.move_allowance(), 3);
        assert_eq!(layout.occupied_cell_count(), 3);
    }

    #[test]
    fn rank_titles_follow_thresholds() {
        assert_eq!(rank_title(0), "NOVICE");
        assert_eq!(rank_title(9), "NOVICE");
        assert_eq!(rank_title(10), "SNAKE CHARMER");
        assert_eq!(rank_title(75), "SERPENT MASTER");
        assert_eq!(rank_title(1_000), "SNAKE GOD");
    }

    #[test]
    fn star_rating_rewards_tight_clears() {
        assert_eq!(star_rating(4, 4), 3);
        assert_eq!(star_rating(5, 4), 2);
        assert_eq!(star_rating(6, 4), 1);
        assert_eq!(star_rating(60, 4), 1);
    }

    #[test]
    fn challenge_levels_quadruple_the_reward() {
        assert_eq!(reward_xp(3, false), 300);
        assert_eq!(reward_xp(3, true), 1_200);
        assert_eq!(reward_xp(1, false), 100);
    }

    fn sample_layout() -> LevelLayout {
        LevelLayout {
            level: LevelIndex::new(7),
            grid: GridSize::new(5),
            snakes: vec![Snake::new(
                SnakeId::new(0),
                vec![CellCoord::new(1, 1), CellCoord::new(0, 1)],
                Direction::Right,
                SnakeColor::from_rgb(0xff, 0xff, 0xff),
            )],
            obstacles: vec![Obstacle::at(3, 3)],
            challenge: false,
            move_buffer: 4,
        }
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn snake_round_trips_through_bincode() {
        let snake = Snake::new(
            SnakeId::new(42),
            vec![CellCoord::new(2, 1), CellCoord::new(2, 2)],
            Direction::Up,
            SnakeColor::from_rgb(0x00, 0xf2, 0xfe),
        );
        assert_round_trip(&snake);
    }

    #[test]
    fn obstacle_round_trips_through_bincode() {
        assert_round_trip(&Obstacle::at(5, 7));
    }

    #[test]
    fn level_layout_round_trips_through_bincode() {
        assert_round_trip(&sample_layout());
    }
}
