// Keychord Binding Table
// Parsed keybindings matched against chords

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::dispatch::{BindingDispatcher, Chord};
use crate::keysym::Keysym;
use crate::modifier::ModifierMask;

/// Error parsing a binding such as `Mod1+Shift+2`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("empty binding")]
    Empty,

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("unknown keysym: {0}")]
    UnknownKeysym(String),

    #[error("binding has no key: {0}")]
    NoKeysym(String),
}

/// The keys half of a binding: modifiers plus a set of keysyms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: ModifierMask,
    pub keysyms: SmallVec<[Keysym; 4]>,
}

impl KeyCombo {
    /// Whether `chord` completes this combination: the key just pressed is one
    /// of ours, and exactly these keys are held with exactly these modifiers
    pub fn matches(&self, chord: &Chord<'_>) -> bool {
        chord.keysyms.iter().any(|sym| self.keysyms.contains(sym))
            && chord.modifiers == self.modifiers
            && chord.pressed.matches(&self.keysyms)
    }
}

impl FromStr for KeyCombo {
    type Err = BindingError;

    /// Tokens naming a modifier count as modifiers wherever they appear; every
    /// other token must name a keysym.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BindingError::Empty);
        }

        let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
        let last = tokens.len() - 1;
        let mut modifiers = ModifierMask::empty();
        let mut keysyms: SmallVec<[Keysym; 4]> = SmallVec::new();

        for (index, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(BindingError::Empty);
            }
            if let Some(mask) = ModifierMask::from_alias(token) {
                modifiers |= mask;
                continue;
            }
            match Keysym::from_name(token) {
                Some(sym) => {
                    if !keysyms.contains(&sym) {
                        keysyms.push(sym);
                    }
                }
                // Leading unknown tokens are most likely misspelled modifiers
                None if keysyms.is_empty() && index != last => {
                    return Err(BindingError::UnknownModifier(token.to_string()))
                }
                None => return Err(BindingError::UnknownKeysym(token.to_string())),
            }
        }

        if keysyms.is_empty() {
            return Err(BindingError::NoKeysym(s.to_string()));
        }
        keysyms.sort();
        Ok(KeyCombo { modifiers, keysyms })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{}+", self.modifiers)?;
        }
        let names: Vec<String> = self.keysyms.iter().map(|sym| sym.name()).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// A key combination and the command it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub combo: KeyCombo,
    pub command: String,
}

/// Runs the command of a matched binding
pub trait CommandExecutor {
    fn execute(&mut self, binding: &Binding, chord: &Chord<'_>);
}

impl<F> CommandExecutor for F
where
    F: FnMut(&Binding, &Chord<'_>),
{
    fn execute(&mut self, binding: &Binding, chord: &Chord<'_>) {
        self(binding, chord)
    }
}

/// Ordered binding table. Lookup returns the first binding that matches.
#[derive(Debug)]
pub struct BindingTable<E> {
    bindings: IndexMap<KeyCombo, Binding>,
    executor: E,
}

impl<E: CommandExecutor> BindingTable<E> {
    pub fn new(executor: E) -> Self {
        Self {
            bindings: IndexMap::new(),
            executor,
        }
    }

    /// Parse `keys` and bind it to `command`, replacing an equal combo
    pub fn bind(
        &mut self,
        keys: &str,
        command: impl Into<String>,
    ) -> Result<&Binding, BindingError> {
        let combo: KeyCombo = keys.parse()?;
        let binding = Binding {
            combo: combo.clone(),
            command: command.into(),
        };
        let (index, previous) = self.bindings.insert_full(combo, binding);
        if let Some(previous) = previous {
            log::warn!(
                "Overwriting binding {} (was {:?})",
                previous.combo,
                previous.command
            );
        }
        Ok(&self.bindings[index])
    }

    /// Remove the binding for `keys`, returning it
    pub fn unbind(&mut self, keys: &str) -> Result<Option<Binding>, BindingError> {
        let combo: KeyCombo = keys.parse()?;
        Ok(self.bindings.shift_remove(&combo))
    }

    /// First binding matching `chord`
    pub fn find(&self, chord: &Chord<'_>) -> Option<&Binding> {
        self.bindings.values().find(|binding| binding.combo.matches(chord))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }
}

impl<E: CommandExecutor> BindingDispatcher for BindingTable<E> {
    fn try_dispatch(&mut self, chord: &Chord<'_>) -> bool {
        let Some(binding) = self.bindings.values().find(|b| b.combo.matches(chord)) else {
            log::trace!("No binding for {}", chord);
            return false;
        };
        log::debug!("Binding {} matched {}: {}", binding.combo, chord, binding.command);
        self.executor.execute(binding, chord);
        true
    }
}
