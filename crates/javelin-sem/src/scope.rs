//! Lexical scopes: the local-variable arena and the environment stack the
//! resolver walks.

use std::collections::HashMap;

use javelin_core::{ClassId, LocalId, MethodId, Name};
use javelin_syntax::TypeDeclId;
use javelin_types::{ConstValue, Flags, Type};

#[derive(Debug, Clone)]
pub struct LocalData {
    pub name: Name,
    pub ty: Type,
    pub flags: Flags,
    /// JVM local slot; shifted when captured finals are prepended.
    pub slot: u32,
    pub value: Option<ConstValue>,
    /// The class whose method body declares this local.
    pub owner: ClassId,
    /// For `val$x` shadow parameters: the local they capture.
    pub accessed_local: Option<LocalId>,
}

#[derive(Default)]
pub struct Locals {
    arena: Vec<LocalData>,
}

impl Locals {
    pub fn alloc(&mut self, data: LocalData) -> LocalId {
        let id = LocalId::from_raw(self.arena.len() as u32);
        self.arena.push(data);
        id
    }

    pub fn get(&self, id: LocalId) -> &LocalData {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: LocalId) -> &mut LocalData {
        &mut self.arena[id.index()]
    }
}

/// One block's name table.
#[derive(Default)]
pub struct BlockScope {
    pub names: HashMap<Name, LocalId>,
}

/// The semantic environment of one enclosing type on the state stack.
pub struct TypeEnv {
    pub class: ClassId,
    pub decl: Option<TypeDeclId>,
    /// Innermost block last.
    pub blocks: Vec<BlockScope>,
    /// Inside a static method, static initializer or static field init.
    pub static_region: bool,
    /// Inside the arguments of `this(...)`/`super(...)`.
    pub in_explicit_ctor: bool,
    pub enclosing_method: Option<MethodId>,
    /// Stack of try contexts; each collects the checked exceptions thrown
    /// inside it.
    pub try_throws: Vec<Vec<Type>>,
    /// Fields of this class already past their initializer, for forward
    /// reference checking.
    pub initialized_fields: Vec<Name>,
    pub next_local_slot: u32,
}

impl TypeEnv {
    pub fn new(class: ClassId, decl: Option<TypeDeclId>) -> Self {
        Self {
            class,
            decl,
            blocks: Vec::new(),
            static_region: false,
            in_explicit_ctor: false,
            enclosing_method: None,
            try_throws: Vec::new(),
            initialized_fields: Vec::new(),
            next_local_slot: 0,
        }
    }

    pub fn find_local(&self, name: &Name) -> Option<LocalId> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.names.get(name).copied())
    }

    pub fn declare_local(&mut self, name: Name, id: LocalId) {
        if let Some(block) = self.blocks.last_mut() {
            block.names.insert(name, id);
        }
    }
}

/// The stack of enclosing type environments; innermost last.
#[derive(Default)]
pub struct EnvStack {
    envs: Vec<TypeEnv>,
}

impl EnvStack {
    pub fn push(&mut self, env: TypeEnv) {
        self.envs.push(env);
    }

    pub fn pop(&mut self) -> Option<TypeEnv> {
        self.envs.pop()
    }

    pub fn top(&self) -> Option<&TypeEnv> {
        self.envs.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut TypeEnv> {
        self.envs.last_mut()
    }

    /// Outward iteration, innermost first.
    pub fn iter_outward(&self) -> impl Iterator<Item = &TypeEnv> {
        self.envs.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn get(&self, depth_from_top: usize) -> Option<&TypeEnv> {
        let len = self.envs.len();
        if depth_from_top < len {
            self.envs.get(len - 1 - depth_from_top)
        } else {
            None
        }
    }
}
