//! Address groups and populations.
//!
//! An address group is the unit a monitor is bound to: a channel plus an
//! ordered list of logical addresses. The order is hardware wiring order and is
//! preserved everywhere; nothing in this crate sorts a group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hardware channel an event stream is scoped to.
pub type Channel = u32;

/// Logical address of a monitored unit within a channel.
pub type Address = u32;

/// A named, ordered set of logical addresses on one channel.
///
/// # Examples
///
/// ```
/// use aermon::AddressGroup;
///
/// let group = AddressGroup::new("exc soma", 0, vec![5, 9, 12]);
/// assert_eq!(group.len(), 3);
/// assert_eq!(group.laddr, vec![5, 9, 12]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressGroup {
    /// Display name.
    pub name: String,

    /// Channel every address in the group lives on.
    pub channel: Channel,

    /// Logical addresses in wiring order.
    pub laddr: Vec<Address>,
}

impl AddressGroup {
    /// Creates an address group.
    #[must_use]
    pub fn new(name: impl Into<String>, channel: Channel, laddr: Vec<Address>) -> Self {
        Self {
            name: name.into(),
            channel,
            laddr,
        }
    }

    /// Number of addresses, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.laddr.len()
    }

    /// True when the group has no address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.laddr.is_empty()
    }

    /// Returns true if `address` belongs to the group.
    #[must_use]
    pub fn contains(&self, address: Address) -> bool {
        self.laddr.contains(&address)
    }
}

/// Anything that exposes a soma group and named synapse groups.
///
/// Populations are owned by the surrounding setup; monitors only need to pick
/// one of their groups.
pub trait AddressGroupSource {
    /// Population name, used in error messages.
    fn name(&self) -> &str;

    /// The primary group, monitored when no synapse is selected.
    fn soma(&self) -> &AddressGroup;

    /// A named synapse group, if the population has one.
    fn synapse(&self, name: &str) -> Option<&AddressGroup>;
}

/// A plain population: a soma group plus synapse groups keyed by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    /// Population name.
    pub name: String,

    /// Soma (neuron output) addresses.
    pub soma: AddressGroup,

    /// Synapse groups, e.g. `"excitatory0"`.
    #[serde(default)]
    pub synapses: BTreeMap<String, AddressGroup>,
}

impl Population {
    /// Creates a population with no synapse groups.
    #[must_use]
    pub fn new(name: impl Into<String>, soma: AddressGroup) -> Self {
        Self {
            name: name.into(),
            soma,
            synapses: BTreeMap::new(),
        }
    }

    /// Adds a synapse group and returns the population.
    #[must_use]
    pub fn with_synapse(mut self, kind: impl Into<String>, group: AddressGroup) -> Self {
        self.synapses.insert(kind.into(), group);
        self
    }
}

impl AddressGroupSource for Population {
    fn name(&self) -> &str {
        &self.name
    }

    fn soma(&self) -> &AddressGroup {
        &self.soma
    }

    fn synapse(&self, name: &str) -> Option<&AddressGroup> {
        self.synapses.get(name)
    }
}
