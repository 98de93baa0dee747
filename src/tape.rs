//! The memory tape: a fixed number of byte cells and a wrapping data pointer.

use crate::BrainfuckReaderError;

/// Tape length used when nothing else is configured.
pub const DEFAULT_TAPE_SIZE: usize = 512;

/// Direction of a data pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Interpreter memory.
///
/// The length is fixed at construction. Moving the pointer past either end
/// wraps to the other end, and cell arithmetic wraps modulo 256.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    high_water: usize,
}

/// A copy of the tape taken after execution, for dump formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeSnapshot {
    pub cells: Vec<u8>,
    /// Highest pointer position reached during the run.
    pub high_water: usize,
}

impl Tape {
    /// Allocate `capacity` zeroed cells with the pointer at cell 0.
    pub fn new(capacity: usize) -> Result<Self, BrainfuckReaderError> {
        if capacity == 0 {
            return Err(BrainfuckReaderError::AllocationFailure { requested: capacity });
        }

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(capacity)
            .map_err(|_| BrainfuckReaderError::AllocationFailure { requested: capacity })?;
        cells.resize(capacity, 0);

        Ok(Self {
            cells,
            pointer: 0,
            high_water: 0,
        })
    }

    pub fn shift(&mut self, direction: Direction) {
        let len = self.cells.len();
        self.pointer = match direction {
            Direction::Left => (self.pointer + len - 1) % len,
            Direction::Right => (self.pointer + 1) % len,
        };
        self.high_water = self.high_water.max(self.pointer);
    }

    pub fn increment(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_sub(1);
    }

    /// Value of the cell under the pointer.
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn snapshot(&self) -> TapeSnapshot {
        TapeSnapshot {
            cells: self.cells.clone(),
            high_water: self.high_water,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_tape_is_zeroed() {
        let tape = Tape::new(8).unwrap();
        assert_eq!(tape.cells(), &[0; 8]);
        assert_eq!(tape.pointer(), 0);
        assert_eq!(tape.high_water(), 0);
    }

    #[test]
    fn zero_capacity_is_an_allocation_failure() {
        let result = Tape::new(0);
        assert!(matches!(result, Err(BrainfuckReaderError::AllocationFailure { requested: 0 })));
    }

    #[test]
    fn huge_capacity_is_an_allocation_failure() {
        let result = Tape::new(usize::MAX);
        assert!(matches!(result, Err(BrainfuckReaderError::AllocationFailure { .. })));
    }

    #[test]
    fn left_of_first_cell_wraps_to_last() {
        let mut tape = Tape::new(5).unwrap();
        tape.shift(Direction::Left);
        assert_eq!(tape.pointer(), 4);
    }

    #[test]
    fn right_of_last_cell_wraps_to_first() {
        let mut tape = Tape::new(3).unwrap();
        for _ in 0..3 {
            tape.shift(Direction::Right);
        }
        assert_eq!(tape.pointer(), 0);
        assert_eq!(tape.high_water(), 2);
    }

    #[test]
    fn single_cell_tape_stays_put() {
        let mut tape = Tape::new(1).unwrap();
        tape.shift(Direction::Left);
        tape.shift(Direction::Right);
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn cell_arithmetic_wraps() {
        let mut tape = Tape::new(1).unwrap();
        tape.decrement();
        assert_eq!(tape.current(), 255);
        tape.increment();
        assert_eq!(tape.current(), 0);
    }

    #[test]
    fn snapshot_is_repeatable() {
        let mut tape = Tape::new(4).unwrap();
        tape.increment();
        tape.shift(Direction::Right);
        tape.decrement();
        let first = tape.snapshot();
        let second = tape.snapshot();
        assert_eq!(first, second);
        assert_eq!(first.cells, vec![1, 255, 0, 0]);
        assert_eq!(first.high_water, 1);
    }

    proptest! {
        #[test]
        fn pointer_always_in_range(
            capacity in 1usize..64,
            moves in prop::collection::vec(any::<bool>(), 0..256)
        ) {
            let mut tape = Tape::new(capacity).unwrap();
            for right in moves {
                tape.shift(if right { Direction::Right } else { Direction::Left });
                prop_assert!(tape.pointer() < capacity);
                prop_assert!(tape.high_water() < capacity);
            }
        }

        #[test]
        fn increments_are_modular(count in 0usize..1024) {
            let mut tape = Tape::new(1).unwrap();
            for _ in 0..count {
                tape.increment();
            }
            prop_assert_eq!(tape.current() as usize, count % 256);
        }
    }
}
