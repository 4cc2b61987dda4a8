//! Edit operations and the behaviour each one switches on
//!
//! Every batch of requests runs under exactly one [`Operation`]. The operation
//! fixes how the tree mutator behaves through [`OperationFlags`]; the table in
//! [`Operation::flags`] is the only place these switches are combined, so no
//! request can run with a mix of flags that no operation defines.

use std::fmt;

/// The six kinds of edit a batch can perform
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Replace existing values, never create
    Update,
    /// Create or replace values, building missing structure
    Add,
    /// Splice values into an existing list
    ExtendList,
    /// Insert a value into a list at a position
    InsertToList,
    /// Delete a key or a list position
    Remove,
    /// Delete a list element by its value
    RemoveListElement,
}

/// Behaviour switches consulted by the tree mutator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationFlags {
    /// Missing keys are created instead of reported
    pub append: bool,
    /// Values are spliced into the target list
    pub extend: bool,
    /// An indexed write inserts rather than overwrites
    pub list_insert: bool,
    pub remove: bool,
    /// Removal matches the element value given in brackets
    pub remove_by_value: bool,
}

impl Operation {
    /// Order in which batches are applied within one invocation
    pub const APPLY_ORDER: [Operation; 6] = [
        Operation::Remove,
        Operation::RemoveListElement,
        Operation::Update,
        Operation::Add,
        Operation::ExtendList,
        Operation::InsertToList,
    ];

    pub fn flags(self) -> OperationFlags {
        let (append, extend, list_insert, remove, remove_by_value) = match self {
            Operation::Update => (false, false, false, false, false),
            Operation::Add => (true, false, false, false, false),
            Operation::ExtendList => (true, true, false, false, false),
            Operation::InsertToList => (true, false, true, false, false),
            Operation::Remove => (false, false, false, true, false),
            Operation::RemoveListElement => (false, false, false, true, true),
        };
        OperationFlags {
            append,
            extend,
            list_insert,
            remove,
            remove_by_value,
        }
    }

    /// Remove-family requests carry no value
    pub fn is_removal(self) -> bool {
        self.flags().remove
    }

    /// What the batch log line says this operation is doing
    pub fn describe(self) -> &'static str {
        match self {
            Operation::Update => "Updating requested keys",
            Operation::Add => "Adding requested keys",
            Operation::ExtendList => "Extending requested list keys",
            Operation::InsertToList => "Inserting requested keys",
            Operation::Remove => "Removing requested keys",
            Operation::RemoveListElement => "Removing requested values from keys",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Update => "update",
            Operation::Add => "add",
            Operation::ExtendList => "extend-list",
            Operation::InsertToList => "insert",
            Operation::Remove => "rm",
            Operation::RemoveListElement => "rm-list-element",
        };
        f.write_str(name)
    }
}
