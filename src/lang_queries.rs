// src/lang_queries.rs
//! Tag queries per language, indexed by language and query-kind ordinals.
//!
//! Captures follow the `name.definition.<type>` / `name.reference.<type>`
//! convention; everything after the prefix becomes the tag's type label.

pub const QUERIES: [[&str; 2]; 4] = [
    // Python
    [
        r"
            (class_definition name: (identifier) @name.definition.class)
            (function_definition name: (identifier) @name.definition.function)
            (call function: (identifier) @name.reference.call)
            (call function: (attribute attribute: (identifier) @name.reference.call))
        ",
        r"
            (class_definition name: (identifier) @name.definition.class)
            (function_definition name: (identifier) @name.definition.function)
            (call function: (identifier) @name.reference.call)
        ",
    ],
    // JavaScript
    [
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (variable_declarator
              name: (identifier) @name.definition.function
              value: [(arrow_function) (function_expression)])
            (call_expression function: (identifier) @name.reference.call)
            (call_expression
              function: (member_expression property: (property_identifier) @name.reference.call))
            (new_expression constructor: (identifier) @name.reference.class)
        ",
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (call_expression function: (identifier) @name.reference.call)
        ",
    ],
    // TypeScript
    [
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (type_identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (interface_declaration name: (type_identifier) @name.definition.interface)
            (type_alias_declaration name: (type_identifier) @name.definition.type)
            (enum_declaration name: (identifier) @name.definition.enum)
            (variable_declarator
              name: (identifier) @name.definition.function
              value: [(arrow_function) (function_expression)])
            (call_expression function: (identifier) @name.reference.call)
            (call_expression
              function: (member_expression property: (property_identifier) @name.reference.call))
            (new_expression constructor: (identifier) @name.reference.class)
            (type_annotation (type_identifier) @name.reference.type)
        ",
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (type_identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (call_expression function: (identifier) @name.reference.call)
        ",
    ],
    // TSX (same grammar family as TypeScript)
    [
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (type_identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (interface_declaration name: (type_identifier) @name.definition.interface)
            (type_alias_declaration name: (type_identifier) @name.definition.type)
            (enum_declaration name: (identifier) @name.definition.enum)
            (variable_declarator
              name: (identifier) @name.definition.function
              value: [(arrow_function) (function_expression)])
            (call_expression function: (identifier) @name.reference.call)
            (call_expression
              function: (member_expression property: (property_identifier) @name.reference.call))
            (new_expression constructor: (identifier) @name.reference.class)
            (type_annotation (type_identifier) @name.reference.type)
        ",
        r"
            (function_declaration name: (identifier) @name.definition.function)
            (class_declaration name: (type_identifier) @name.definition.class)
            (method_definition name: (property_identifier) @name.definition.method)
            (call_expression function: (identifier) @name.reference.call)
        ",
    ],
];
