//! Name lookup.
//!
//! Two flavors: unqualified lookup walks the scope chain outward,
//! qualified (member) lookup searches a type's declaration space. Both are
//! memoized; the member tables are keyed by canonical type and the scope
//! the lookup is exposed to, because extensions can make different members
//! visible from different places.

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, DeclKind, Name, ScopeId, ScopeKind};
use vela_types::Ty;

use super::TypeChecker;

impl TypeChecker<'_> {
    /// Declarations named `stem` visible from `scope` by unqualified
    /// lookup.
    ///
    /// The walk stops at the innermost scope introducing a
    /// non-overloadable match; function overloads keep accumulating all
    /// the way to module level. When the chain yields nothing, the module's
    /// own name is tried, then the top level of every other module.
    pub(crate) fn unqualified_lookup(&mut self, stem: Name, from: ScopeId) -> Vec<DeclId> {
        let mut matches: Vec<DeclId> = Vec::new();
        for scope in self.ast.scopes_from(from).collect::<Vec<_>>() {
            let found = match self.ast.scope(scope).kind {
                // File-level names belong to the module; visiting them here
                // would search the same table twice.
                ScopeKind::File => continue,
                ScopeKind::Module(module) => self.module_level_decls_named(module, stem),
                _ => self.decls_named_in(stem, scope),
            };
            if found.is_empty() {
                continue;
            }
            let all_overloadable = found
                .iter()
                .all(|d| self.ast.decl(*d).is_overloadable());
            matches.extend(found);
            if !all_overloadable {
                break;
            }
        }
        if !matches.is_empty() {
            return matches;
        }

        let Some(module) = self.ast.module_containing(from) else {
            return matches;
        };
        if let DeclKind::Module(m) = self.ast.decl(module) {
            if m.name == stem {
                return vec![module];
            }
        }
        for other in self.ast.modules().to_vec() {
            if other != module {
                matches.extend(self.module_level_decls_named(other, stem));
            }
        }
        matches
    }

    /// Members of `of` named `stem`, as visible from `scope`.
    pub(crate) fn member_lookup(&mut self, stem: Name, of: &Ty, scope: ScopeId) -> Vec<DeclId> {
        let canonical = self.relations.canonical(of);
        let key = (canonical.clone(), scope);
        if !self.member_tables.contains_key(&key) {
            let table = self.compute_member_table(&canonical, scope);
            self.member_tables.insert(key.clone(), table);
        }
        self.member_tables
            .get(&key)
            .and_then(|table| table.get(&stem))
            .cloned()
            .unwrap_or_default()
    }

    fn compute_member_table(
        &mut self,
        subject: &Ty,
        scope: ScopeId,
    ) -> FxHashMap<Name, Vec<DeclId>> {
        let mut table = FxHashMap::default();
        match subject {
            // Members come in layers: the type's own declaration space,
            // then extensions, then conformances. A name answered by a
            // non-overloadable match in one layer is not searched further;
            // only function overloads accumulate across layers.
            Ty::Product(decl) => {
                let members = self.ast.product_type(*decl).members.clone();
                let memberwise = self.ast.product_type(*decl).memberwise_init;
                self.add_member(&mut table, memberwise);
                for m in members {
                    self.add_member(&mut table, m);
                }

                let mut extended = FxHashMap::default();
                for extension in self.extending_decls(subject, scope) {
                    for m in self.extension_members(extension) {
                        self.add_member(&mut extended, m);
                    }
                }
                self.merge_layer(&mut table, extended);

                // Conformances contribute their non-associated members;
                // associated declarations have no meaning on a concrete
                // type.
                let mut inherited = FxHashMap::default();
                for trait_decl in self.conformed_trait_decls(subject, scope) {
                    let trait_members = self.ast.trait_decl(trait_decl).members.clone();
                    for m in trait_members {
                        if matches!(
                            self.ast.decl(m),
                            DeclKind::AssociatedType(_) | DeclKind::AssociatedValue(_)
                        ) {
                            continue;
                        }
                        self.add_member(&mut inherited, m);
                    }
                }
                self.merge_layer(&mut table, inherited);
            }
            Ty::Trait(decl) => {
                let members = self.ast.trait_decl(*decl).members.clone();
                for m in members {
                    self.add_member(&mut table, m);
                }
                // Refinements contribute their members transitively, below
                // the trait's own declaration space.
                let mut refined_members = FxHashMap::default();
                for refined in self.conformed_traits(*decl).unwrap_or_default() {
                    if refined == *decl {
                        continue;
                    }
                    let members = self.ast.trait_decl(refined).members.clone();
                    for m in members {
                        self.add_member(&mut refined_members, m);
                    }
                }
                self.merge_layer(&mut table, refined_members);
            }
            Ty::BoundGeneric { base, .. } => {
                return self.compute_member_table(&base.clone(), scope);
            }
            Ty::Alias { aliasee, .. } => {
                return self.compute_member_table(&aliasee.clone(), scope);
            }
            Ty::Skolem(base) => {
                return self.compute_member_table(&base.clone(), scope);
            }
            Ty::GenericParam(decl) => {
                // A generic parameter exposes the members of its bounds.
                for trait_decl in self.bounds_of_generic_param(*decl) {
                    let inner = self.compute_member_table(&Ty::Trait(trait_decl), scope);
                    for (name, decls) in inner {
                        table.entry(name).or_insert_with(Vec::new).extend(decls);
                    }
                }
            }
            Ty::ConformanceLens { lens, .. } => {
                return self.compute_member_table(&lens.clone(), scope);
            }
            Ty::Metatype(instance) => {
                // Member access on a type name sees static members,
                // initializers, and nested types.
                let inner = self.compute_member_table(&instance.clone(), scope);
                for (name, decls) in inner {
                    let statics: Vec<DeclId> = decls
                        .into_iter()
                        .filter(|d| !self.ast.is_non_static_member(*d))
                        .collect();
                    if !statics.is_empty() {
                        table.insert(name, statics);
                    }
                }
            }
            _ => {}
        }
        table
    }

    /// Merge a lower-precedence layer into `table`, per name. A name the
    /// table already answers with a non-overloadable match keeps its
    /// answer; otherwise the layer's entries are appended.
    fn merge_layer(
        &self,
        table: &mut FxHashMap<Name, Vec<DeclId>>,
        layer: FxHashMap<Name, Vec<DeclId>>,
    ) {
        for (name, decls) in layer {
            let entry = table.entry(name).or_insert_with(Vec::new);
            if entry.iter().any(|d| !self.ast.decl(*d).is_overloadable()) {
                continue;
            }
            for decl in decls {
                if !entry.contains(&decl) {
                    entry.push(decl);
                }
            }
        }
    }

    fn add_member(&self, table: &mut FxHashMap<Name, Vec<DeclId>>, member: DeclId) {
        for (name, decl) in self.stems_of(member) {
            let entry = table.entry(name).or_insert_with(Vec::new);
            if !entry.contains(&decl) {
                entry.push(decl);
            }
        }
    }

    /// Declarations named `stem` introduced directly in `scope`.
    pub(crate) fn decls_named_in(&mut self, stem: Name, scope: ScopeId) -> Vec<DeclId> {
        if !self.scope_names.contains_key(&scope) {
            let mut table = FxHashMap::default();
            for decl in self.ast.decls_in(scope).to_vec() {
                for (name, introduced) in self.stems_of(decl) {
                    table
                        .entry(name)
                        .or_insert_with(Vec::new)
                        .push(introduced);
                }
            }
            self.scope_names.insert(scope, table);
        }
        self.scope_names
            .get(&scope)
            .and_then(|table| table.get(&stem))
            .cloned()
            .unwrap_or_default()
    }

    /// Declarations named `stem` at the top level of `module`, across all
    /// of its files.
    pub(crate) fn module_level_decls_named(&mut self, module: DeclId, stem: Name) -> Vec<DeclId> {
        let mut found = Vec::new();
        if let Some(scope) = self.ast.scope_of(module) {
            found.extend(self.decls_named_in(stem, scope));
        }
        for file in self.ast.files_of(module).to_vec() {
            found.extend(self.decls_named_in(stem, file));
        }
        found
    }

    /// The names a declaration introduces, with the declaration actually
    /// found under each. A binding introduces its pattern's variables, not
    /// itself.
    fn stems_of(&self, decl: DeclId) -> Vec<(Name, DeclId)> {
        match self.ast.decl(decl) {
            DeclKind::Module(d) => vec![(d.name, decl)],
            DeclKind::Namespace(d) => vec![(d.name, decl)],
            DeclKind::Function(d) => d.name.map(|n| (n, decl)).into_iter().collect(),
            DeclKind::Initializer(_) => vec![(self.well_known.init, decl)],
            DeclKind::Method(d) => vec![(d.name, decl)],
            DeclKind::Subscript(d) => d.name.map(|n| (n, decl)).into_iter().collect(),
            DeclKind::ProductType(d) => vec![(d.name, decl)],
            DeclKind::Trait(d) => vec![(d.name, decl)],
            DeclKind::TypeAlias(d) => vec![(d.name, decl)],
            DeclKind::AssociatedType(d) => vec![(d.name, decl)],
            DeclKind::AssociatedValue(d) => vec![(d.name, decl)],
            DeclKind::GenericParameter(d) => vec![(d.name, decl)],
            DeclKind::Parameter(d) => vec![(d.name, decl)],
            DeclKind::Binding(d) => {
                let mut vars = Vec::new();
                self.ast.collect_pattern_vars(d.pattern, &mut vars);
                vars.into_iter()
                    .map(|v| match self.ast.decl(v) {
                        DeclKind::Var(var) => (var.name, v),
                        _ => unreachable!("patterns bind only variables"),
                    })
                    .collect()
            }
            // Variables surface through their binding declaration; listing
            // them here as well would double every entry.
            DeclKind::Var(_) => Vec::new(),
            DeclKind::Operator(d) => vec![(d.name, decl)],
            // These introduce no name of their own.
            DeclKind::MethodImpl(_)
            | DeclKind::SubscriptImpl(_)
            | DeclKind::Conformance(_)
            | DeclKind::Extension(_) => Vec::new(),
        }
    }

    /// Extension and conformance declarations applying to `subject` that
    /// are visible from `scope`.
    ///
    /// Declarations currently having their subject realized are skipped;
    /// an extension cannot apply to a type spelled in terms of itself
    /// while that spelling is still being resolved.
    pub(crate) fn extending_decls(&mut self, subject: &Ty, scope: ScopeId) -> Vec<DeclId> {
        let canonical = self.relations.canonical(subject);
        let mut extending = Vec::new();
        let Some(module) = self.ast.module_containing(scope) else {
            return extending;
        };
        // Extensions are visible program-wide; iterate every module so one
        // module can extend another's types.
        let mut modules = self.ast.modules().to_vec();
        if let Some(i) = modules.iter().position(|m| *m == module) {
            modules.swap(0, i);
        }
        for module in modules {
            for decl in self.ast.top_level_decls(module) {
                let subject_expr = match self.ast.decl(decl) {
                    DeclKind::Extension(e) => e.subject,
                    DeclKind::Conformance(c) => c.subject,
                    _ => continue,
                };
                if self.extensions_under_binding.contains(&decl) {
                    continue;
                }
                self.extensions_under_binding.insert(decl);
                let Some(decl_scope) = self.ast.scope_of(decl) else {
                    self.extensions_under_binding.remove(&decl);
                    continue;
                };
                let realized = self.realize_type_expr(subject_expr, decl_scope);
                self.extensions_under_binding.remove(&decl);
                if self.relations.canonical(&realized) == canonical {
                    extending.push(decl);
                }
            }
        }
        extending
    }

    /// The members an extension or conformance declaration adds.
    pub(crate) fn extension_members(&self, decl: DeclId) -> Vec<DeclId> {
        match self.ast.decl(decl) {
            DeclKind::Extension(e) => e.members.clone(),
            DeclKind::Conformance(c) => c.members.clone(),
            _ => Vec::new(),
        }
    }
}
