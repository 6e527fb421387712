#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Occupancy index and solvability oracle for candidate board states.
//!
//! A configuration is clearable exactly when no snake's escape path runs into
//! an obstacle and the directed blocking graph between snakes is acyclic: an
//! acyclic graph admits a topological order in which snakes exit one at a
//! time, while a cycle means no member can ever move first. The check is
//! binary and is the single source of truth for board fairness; callers must
//! never commit a configuration that fails it.

use std::collections::HashMap;

use snake_escape_core::{CellCoord, GridSize, Obstacle, Snake, SnakeId};

/// Cell contents recorded in the dense occupancy index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Occupant {
    Snake(SnakeId),
    Obstacle,
}

/// Dense cell-to-occupant index rebuilt per query.
struct OccupancyIndex {
    side: usize,
    cells: Vec<Option<Occupant>>,
}

impl OccupancyIndex {
    fn build(snakes: &[Snake], obstacles: &[Obstacle], grid: GridSize) -> Self {
        let side = grid.get() as usize;
        let mut cells = vec![None; side.saturating_mul(side)];

        for snake in snakes {
            for &cell in &snake.cells {
                if grid.contains(cell) {
                    cells[index(side, cell)] = Some(Occupant::Snake(snake.id));
                }
            }
        }
        // Obstacles win conflicting writes so the raycast sees them first.
        for obstacle in obstacles {
            if grid.contains(obstacle.cell()) {
                cells[index(side, obstacle.cell())] = Some(Occupant::Obstacle);
            }
        }

        Self { side, cells }
    }

    fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.cells[index(self.side, cell)]
    }
}

fn index(side: usize, cell: CellCoord) -> usize {
    cell.y() as usize * side + cell.x() as usize
}

/// Determines whether every snake can eventually slide off the board.
///
/// Raycasts each head along its travel direction to the grid boundary. An
/// obstacle on any escape path makes the configuration permanently
/// unsolvable. Snakes crossed by the ray become blocking edges in a
/// dependency graph, and the configuration is solvable iff that graph is
/// acyclic. Runs in O(N·R + N + E) for N snakes, ray length R, and E edges,
/// cheap enough to be consulted once per tentative placement.
#[must_use]
pub fn is_solvable(snakes: &[Snake], obstacles: &[Obstacle], grid: GridSize) -> bool {
    let occupancy = OccupancyIndex::build(snakes, obstacles, grid);

    let mut node_of: HashMap<SnakeId, usize> = HashMap::with_capacity(snakes.len());
    for (node, snake) in snakes.iter().enumerate() {
        let _ = node_of.insert(snake.id, node);
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); snakes.len()];
    let mut seen = vec![false; snakes.len()];

    for (node, snake) in snakes.iter().enumerate() {
        // A snake with no cells can never be activated.
        let Some(head) = snake.head() else {
            return false;
        };

        seen.fill(false);
        let mut cursor = head;
        loop {
            let Some(next) = cursor.stepped(snake.direction) else {
                break;
            };
            if !grid.contains(next) {
                break;
            }
            cursor = next;

            match occupancy.occupant(cursor) {
                Some(Occupant::Obstacle) => return false,
                Some(Occupant::Snake(other)) if other != snake.id => {
                    let blocker = node_of[&other];
                    if !seen[blocker] {
                        seen[blocker] = true;
                        adjacency[node].push(blocker);
                    }
                }
                _ => {}
            }
        }
    }

    !has_cycle(&adjacency)
}

/// Explicit-stack depth-first search with three-colour marking.
fn has_cycle(adjacency: &[Vec<usize>]) -> bool {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; adjacency.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..adjacency.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        marks[start] = Mark::OnStack;
        stack.push((start, 0));

        while let Some((node, edge)) = stack.pop() {
            if let Some(&next) = adjacency[node].get(edge) {
                stack.push((node, edge + 1));
                match marks[next] {
                    Mark::OnStack => return true,
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        stack.push((next, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
            }
        }
    }

    false
}
