/// An enumeration representing the phase of a breathing cycle.
///
/// Phases always follow each other in the order `Inhale → Hold → Exhale → Inhale → …`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum Phase {
    /// Breathing in while the circle expands
    Inhale,
    /// Holding the breath while the circle is full
    Hold,
    /// Breathing out while the circle contracts
    Exhale,
}

impl Phase {
    /// Return the phase that follows this one.
    pub(crate) fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Inhale,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Inhale
    }
}

#[cfg(test)]
mod tests {
    use super::Phase;

    #[test]
    fn cycles_in_fixed_order() {
        assert_eq!(Phase::Inhale.next(), Phase::Hold);
        assert_eq!(Phase::Hold.next(), Phase::Exhale);
        assert_eq!(Phase::Exhale.next(), Phase::Inhale);
    }

    #[test]
    fn three_steps_return_to_start() {
        for phase in [Phase::Inhale, Phase::Hold, Phase::Exhale].iter().copied() {
            assert_eq!(phase.next().next().next(), phase);
        }
    }
}
