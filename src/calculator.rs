use rand::Rng;

/// One full revolution, in degrees.
pub const ROUND_ANGLE: f64 = 360.0;
/// How many full turns every spin makes on top of its landing offset, so an
/// animation layer has something visually convincing to interpolate over.
pub const ROTATE_COUNT: u32 = 20;
/// Fixed rotation offset shared by the generator and the decoder.
pub const SPIN_OFFSET: f64 = ROTATE_COUNT as f64 * ROUND_ANGLE;

/// Picks the total rotation angle for one spin.
///
/// A negative `forced` spins free: the base angle is uniform over [0, 360).
/// A non-negative `forced` pins the landing sector: the base angle is uniform
/// over [forced * span, (forced + 1) * span). Either way SPIN_OFFSET is added
/// before returning.
///
/// `forced` is not checked against the sector count; an out-of-range index
/// passes through and decodes back out of range (see `sector_from_outcome`).
pub fn pick_outcome_angle<R: Rng>(rng: &mut R, forced: i32, span: f64) -> f64 {
  let base = if forced >= 0 {
    let low = forced as f64 * span;
    rng.gen_range(low..low + span)
  } else {
    rng.gen_range(0.0..ROUND_ANGLE)
  };
  base + SPIN_OFFSET
}

/// Maps a tap coordinate to the index of the sector under it.
///
/// atan2 takes x-then-y here on purpose: sectors are drawn starting half a
/// span above twelve o'clock and proceed clockwise, and the swapped axes plus
/// the 180 degree flip below line the screen-space angle up with that
/// numbering. A tap on the exact center yields atan2(0, 0) == 0 and maps like
/// any other straight-down tap.
pub fn sector_from_point(point: (f64, f64), surface: (f64, f64), span: f64) -> i32 {
  let dx = point.0 - surface.0 / 2.0;
  let dy = point.1 - surface.1 / 2.0;

  let mut degrees = dx.atan2(dy).to_degrees();
  // Wrap into [0, 360)
  if degrees < 0.0 {
    degrees += ROUND_ANGLE;
  }

  // Phase flip onto the drawing origin
  let mapped = if degrees >= 180.0 {
    degrees - 180.0
  } else {
    degrees + 180.0
  };

  (mapped / span) as i32
}

/// Decodes a finished rotation back to its landing sector index. This is the
/// exact inverse of `pick_outcome_angle` once the random base angle is fixed.
pub fn sector_from_outcome(outcome: f64, span: f64) -> i32 {
  ((outcome - SPIN_OFFSET) / span) as i32
}
