use super::TrailedInt;
use super::TrailedValues;

/// A reversible flag that can switch once from `false` to `true`.
/// Backtracking past the switch point resets it.
#[derive(Debug, Clone, Copy)]
pub struct RevSwitch {
    value: TrailedInt,
}

impl RevSwitch {
    pub fn new(trailed: &mut TrailedValues) -> Self {
        RevSwitch {
            value: trailed.grow(0),
        }
    }

    pub fn switched(&self, trailed: &TrailedValues) -> bool {
        trailed.read(self.value) != 0
    }

    pub fn switch(&self, trailed: &mut TrailedValues) {
        trailed.assign(self.value, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_is_undone_by_backtracking() {
        let mut trailed = TrailedValues::default();
        let switch = RevSwitch::new(&mut trailed);

        assert!(!switch.switched(&trailed));

        trailed.push_level();
        switch.switch(&mut trailed);
        assert!(switch.switched(&trailed));

        trailed.undo_to(0);
        assert!(!switch.switched(&trailed));
    }
}
