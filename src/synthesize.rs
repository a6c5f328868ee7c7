//! Descriptor Synthesizer
//!
//! Turns extracted fragments into a [`ComponentDescriptor`]. Nothing is
//! executed here: every procedure is emitted as JavaScript function source
//! that the host evaluates, tagged with the configured [`TrustLevel`].
//! Isolation is the host's job.

use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingPattern, Expression, Function, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SynthesisError;
use crate::extract::{InitializerFragment, MethodFragment, ScriptFragments};
use crate::options::{CompilerOptions, TrustLevel};

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTOR TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// A host-executed function, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptProcedure {
    pub params: Vec<String>,
    /// The captured fragment, verbatim.
    pub body: String,
    /// Complete function expression the host evaluates.
    pub source: String,
    pub trust: TrustLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Initializer {
    /// Reactive setup. Always returns `{}`; whatever the body declares stays
    /// local to the call and is listed in `unexposed_bindings`.
    Setup {
        procedure: ScriptProcedure,
        #[serde(rename = "unexposedBindings")]
        unexposed_bindings: Vec<String>,
    },
    /// Classic state factory.
    Data { procedure: ScriptProcedure },
}

impl Initializer {
    pub fn procedure(&self) -> &ScriptProcedure {
        match self {
            Initializer::Setup { procedure, .. } | Initializer::Data { procedure } => procedure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<BTreeMap<String, ScriptProcedure>>,
}

impl ComponentDescriptor {
    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
    }

    pub fn has_methods(&self) -> bool {
        self.methods.is_some()
    }

    pub fn method(&self, name: &str) -> Option<&ScriptProcedure> {
        self.methods.as_ref().and_then(|m| m.get(name))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTHESIS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn synthesize(
    template: &str,
    fragments: ScriptFragments,
    options: &CompilerOptions,
) -> Result<ComponentDescriptor, SynthesisError> {
    let initializer = match fragments.initializer {
        Some(InitializerFragment::Setup(body)) => Some(synthesize_setup(body, options)?),
        Some(InitializerFragment::Data(body)) => Some(synthesize_data(body, options)?),
        None => None,
    };

    let methods = match fragments.methods {
        Some(entries) => Some(synthesize_methods(entries, options)?),
        None => None,
    };

    Ok(ComponentDescriptor {
        template: template.to_string(),
        initializer,
        methods,
    })
}

fn synthesize_setup(body: String, options: &CompilerOptions) -> Result<Initializer, SynthesisError> {
    let params = options.reactive_primitives.clone();
    let source = format!("function ({}) {{\n{}\nreturn {{}};\n}}", params.join(", "), body);

    let inspection = inspect_function(&source);
    check(&inspection, "setup()", options)?;

    Ok(Initializer::Setup {
        procedure: ScriptProcedure {
            params,
            body,
            source,
            trust: options.trust,
        },
        unexposed_bindings: inspection.declared,
    })
}

fn synthesize_data(body: String, options: &CompilerOptions) -> Result<Initializer, SynthesisError> {
    let source = format!("function () {{\nreturn {{{}}};\n}}", body);

    let inspection = inspect_function(&source);
    check(&inspection, "data()", options)?;

    Ok(Initializer::Data {
        procedure: ScriptProcedure {
            params: Vec::new(),
            body,
            source,
            trust: options.trust,
        },
    })
}

fn synthesize_methods(
    entries: Vec<MethodFragment>,
    options: &CompilerOptions,
) -> Result<BTreeMap<String, ScriptProcedure>, SynthesisError> {
    let mut methods = BTreeMap::new();

    for entry in entries {
        let source = format!("function ({}) {{{}}}", entry.params.join(", "), entry.body);

        let inspection = inspect_function(&source);
        check(&inspection, &format!("method `{}`", entry.name), options)?;

        // Later entries win, as with duplicate object keys.
        methods.insert(
            entry.name,
            ScriptProcedure {
                params: entry.params,
                body: entry.body,
                source,
                trust: options.trust,
            },
        );
    }

    Ok(methods)
}

fn check(
    inspection: &FunctionInspection,
    procedure: &str,
    options: &CompilerOptions,
) -> Result<(), SynthesisError> {
    if !options.verify_syntax {
        return Ok(());
    }
    match inspection.errors.first() {
        Some(message) => Err(SynthesisError::Rejected {
            procedure: procedure.to_string(),
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE INSPECTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct FunctionInspection {
    errors: Vec<String>,
    /// Top-level declarations in the function body, in source order.
    declared: Vec<String>,
}

/// Parse `source` as a sloppy-mode function expression, the way the host's
/// code construction would see it.
fn inspect_function(source: &str) -> FunctionInspection {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(false);
    let wrapped = format!("({});", source);
    let ret = Parser::new(&allocator, &wrapped, source_type).parse();

    let mut inspection = FunctionInspection::default();

    if ret.panicked || !ret.errors.is_empty() {
        inspection.errors = ret.errors.iter().map(|e| e.to_string()).collect();
        if inspection.errors.is_empty() {
            inspection.errors.push("parser aborted".to_string());
        }
        return inspection;
    }

    // The host evaluates `source` as one expression; anything that closes the
    // function early and trails statements after it is not a procedure.
    let func = match &ret.program.body[..] {
        [Statement::ExpressionStatement(expr_stmt)] => function_expression(&expr_stmt.expression),
        _ => None,
    };
    let Some(func) = func else {
        inspection
            .errors
            .push("text does not form a single function expression".to_string());
        return inspection;
    };

    if let Some(body) = &func.body {
        for stmt in &body.statements {
            collect_declarations(stmt, &mut inspection.declared);
        }
    }

    inspection
}

fn function_expression<'a, 'b>(expr: &'b Expression<'a>) -> Option<&'b Function<'a>> {
    match expr {
        Expression::FunctionExpression(func) => Some(&**func),
        Expression::ParenthesizedExpression(paren) => function_expression(&paren.expression),
        _ => None,
    }
}

fn collect_declarations(stmt: &Statement, names: &mut Vec<String>) {
    match stmt {
        Statement::VariableDeclaration(var_decl) => {
            for decl in &var_decl.declarations {
                collect_binding_pattern(&decl.id, names);
            }
        }
        Statement::FunctionDeclaration(func_decl) => {
            if let Some(id) = &func_decl.id {
                push_unique(names, id.name.to_string());
            }
        }
        Statement::ClassDeclaration(class_decl) => {
            if let Some(id) = &class_decl.id {
                push_unique(names, id.name.to_string());
            }
        }
        _ => {}
    }
}

fn collect_binding_pattern(pattern: &BindingPattern, names: &mut Vec<String>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            push_unique(names, id.name.to_string());
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_pattern(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_pattern(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for pattern in arr.elements.iter().flatten() {
                collect_binding_pattern(pattern, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_pattern(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            collect_binding_pattern(&assign.left, names);
        }
    }
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
