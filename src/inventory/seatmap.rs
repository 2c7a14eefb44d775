/// Marker for a free seat slot in the wire encoding.
pub const FREE_SEAT: u8 = b'0';

/// Seat occupancy for one flight on one date.
///
/// The storage form is a fixed-width string with one character per seat:
/// '0' means free, anything else is the occupant's category marker. Seat
/// numbers are 1-based; seat n lives at position n-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMap {
    slots: Vec<u8>,
}

impl SeatMap {
    pub fn empty(capacity: usize) -> Self {
        Self {
            slots: vec![FREE_SEAT; capacity],
        }
    }

    /// Decode the stored string, padding or truncating to the flight's
    /// capacity so a capacity change never panics the ledger.
    pub fn from_wire(wire: &str, capacity: usize) -> Self {
        let mut slots: Vec<u8> = wire.bytes().take(capacity).collect();
        slots.resize(capacity, FREE_SEAT);
        Self { slots }
    }

    pub fn to_wire(&self) -> String {
        String::from_utf8_lossy(&self.slots).into_owned()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_free(&self, seat: u32) -> bool {
        match seat.checked_sub(1).map(|i| i as usize) {
            Some(idx) if idx < self.slots.len() => self.slots[idx] == FREE_SEAT,
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|&&s| s != FREE_SEAT).count()
    }

    pub fn free_count(&self) -> usize {
        self.slots.len() - self.occupied_count()
    }

    /// Claim one seat per marker, first-fit from the lowest seat number.
    /// On insufficient capacity the map is left unchanged and the current
    /// free count is returned as the error.
    pub fn allocate(&mut self, markers: &[u8]) -> Result<Vec<u32>, usize> {
        if markers.len() > self.free_count() {
            return Err(self.free_count());
        }

        let mut assigned = Vec::with_capacity(markers.len());
        let mut next = 0;
        for &marker in markers {
            while self.slots[next] != FREE_SEAT {
                next += 1;
            }
            self.slots[next] = marker;
            assigned.push(next as u32 + 1);
        }
        Ok(assigned)
    }

    /// Free one seat. Already-free and out-of-range seats are ignored.
    pub fn release(&mut self, seat: u32) {
        if let Some(idx) = seat.checked_sub(1).map(|i| i as usize) {
            if idx < self.slots.len() {
                self.slots[idx] = FREE_SEAT;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip_pads_to_capacity() {
        let map = SeatMap::from_wire("A0C0", 6);
        assert_eq!(map.to_wire(), "A0C000");
        assert_eq!(map.capacity(), 6);
        assert_eq!(map.occupied_count(), 2);
    }

    #[test]
    fn test_allocate_first_fit_lowest_seats() {
        let mut map = SeatMap::from_wire("A00C0", 5);
        let seats = map.allocate(b"AA").unwrap();
        assert_eq!(seats, vec![2, 3]);
        assert_eq!(map.to_wire(), "AAAC0");
    }

    #[test]
    fn test_allocate_insufficient_leaves_map_unchanged() {
        let mut map = SeatMap::from_wire("AAA0", 4);
        let before = map.clone();
        assert_eq!(map.allocate(b"AC"), Err(1));
        assert_eq!(map, before);
    }

    #[test]
    fn test_allocate_exact_remaining_capacity() {
        let mut map = SeatMap::empty(3);
        let seats = map.allocate(b"ACI").unwrap();
        assert_eq!(seats, vec![1, 2, 3]);
        assert_eq!(map.free_count(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut map = SeatMap::from_wire("A0", 2);
        map.release(1);
        map.release(1);
        map.release(2);
        map.release(99);
        assert_eq!(map.to_wire(), "00");
        assert_eq!(map.occupied_count(), 0);
    }

    #[test]
    fn test_total_booked_matches_occupied_positions() {
        let mut map = SeatMap::empty(12);
        map.allocate(b"AACI").unwrap();
        map.release(2);
        assert_eq!(map.occupied_count(), 3);
        assert_eq!(map.free_count(), 9);
    }
}
