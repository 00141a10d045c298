//! Final buffer assembly
//!
//! `output = A[..len(A) - n] ++ transition ++ B[n..]`, so the output holds
//! exactly `len(A) + len(B) - n` frames.

use crate::compositor::check_length;
use crate::error::{CrossfadeError, Result, SignalRole};
use crate::signal::Signal;

/// Stitch the untouched prefix of `outgoing`, the transition and the untouched
/// suffix of `incoming` into one signal
pub fn assemble(
    outgoing: &Signal,
    incoming: &Signal,
    transition: &Signal,
    transition_frames: usize,
) -> Result<Signal> {
    outgoing.check_compatible(incoming)?;
    outgoing.check_compatible(transition)?;
    if transition.frames() != transition_frames {
        return Err(CrossfadeError::InvalidParameter(format!(
            "transition holds {} frames, expected {}",
            transition.frames(),
            transition_frames
        )));
    }
    check_length(outgoing, SignalRole::Outgoing, transition_frames)?;
    check_length(incoming, SignalRole::Incoming, transition_frames)?;

    let prefix = outgoing.slice(0..outgoing.frames() - transition_frames)?;
    let suffix = incoming.slice(transition_frames..incoming.frames())?;
    let output = Signal::concat(&[&prefix, transition, &suffix])?;

    tracing::debug!(
        "Assembled {} + {} + {} = {} frames",
        prefix.frames(),
        transition.frames(),
        suffix.frames(),
        output.frames()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: &[f32]) -> Signal {
        Signal::new(vec![samples.to_vec()], 44100).unwrap()
    }

    #[test]
    fn test_assembly_layout() {
        let a = mono(&[1.0, 2.0, 3.0, 4.0]);
        let b = mono(&[5.0, 6.0, 7.0]);
        let transition = mono(&[9.0, 9.0]);
        let out = assemble(&a, &b, &transition, 2).unwrap();
        assert_eq!(out.channel(0).unwrap(), &[1.0, 2.0, 9.0, 9.0, 7.0]);
        assert_eq!(out.frames(), a.frames() + b.frames() - 2);
    }

    #[test]
    fn test_zero_length_transition_is_concatenation() {
        let a = mono(&[1.0, 2.0]);
        let b = mono(&[3.0]);
        let empty = mono(&[]);
        let out = assemble(&a, &b, &empty, 0).unwrap();
        assert_eq!(out.channel(0).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_whole_signals_consumed() {
        let a = mono(&[1.0, 2.0]);
        let b = mono(&[3.0, 4.0]);
        let transition = mono(&[0.0, 0.0]);
        let out = assemble(&a, &b, &transition, 2).unwrap();
        assert_eq!(out.channel(0).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_wrong_transition_length_rejected() {
        let a = mono(&[1.0, 2.0, 3.0]);
        let b = mono(&[1.0, 2.0, 3.0]);
        let transition = mono(&[0.0]);
        assert!(matches!(
            assemble(&a, &b, &transition, 2),
            Err(CrossfadeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_short_incoming_rejected() {
        let a = mono(&[1.0, 2.0, 3.0]);
        let b = mono(&[1.0]);
        let transition = mono(&[0.0, 0.0]);
        assert!(matches!(
            assemble(&a, &b, &transition, 2),
            Err(CrossfadeError::InsufficientLength {
                role: SignalRole::Incoming,
                ..
            })
        ));
    }
}
