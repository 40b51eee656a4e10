//! Instance validation against a schema subset
//!
//! Supported: global and local `xs:element` (`name`, `ref`, `type`,
//! `minOccurs`, `maxOccurs`), named and anonymous `xs:complexType`
//! (`mixed`, `xs:sequence`, `xs:choice`, `xs:all`, `xs:simpleContent`),
//! `xs:simpleType` restrictions (base type only), `xs:any`, `xs:attribute`
//! (`type`, `use="required"`) and `xs:anyAttribute`.
//!
//! Names are compared by local part; namespaces are not resolved. An element
//! carrying `null="true"` is exempt from its content-type check.

use std::collections::HashMap;

use crate::schema::types::XsdType;
use crate::tree::HierarchicalNode;

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn is_schema_node(node: &HierarchicalNode, name: &str) -> bool {
    local(&node.tag) == name
}

/// `(minOccurs, maxOccurs)` of a particle; unbounded is `usize::MAX`
fn occurs(particle: &HierarchicalNode) -> (usize, usize) {
    let min = particle
        .attribute("minOccurs")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);
    let max = match particle.attribute("maxOccurs").map(str::trim) {
        Some("unbounded") => usize::MAX,
        Some(v) => v.parse().unwrap_or(1),
        None => 1,
    };
    (min, max)
}

/// Interprets schema declarations against instance trees
pub struct SchemaValidator<'s> {
    elements: HashMap<&'s str, &'s HierarchicalNode>,
    complex_types: HashMap<&'s str, &'s HierarchicalNode>,
    simple_types: HashMap<&'s str, &'s HierarchicalNode>,
}

impl<'s> SchemaValidator<'s> {
    /// Index the global declarations of a parsed schema document
    pub fn new(schema: &'s HierarchicalNode) -> Result<Self, String> {
        if !is_schema_node(schema, "schema") {
            return Err(format!(
                "schema root must be xs:schema, found <{}>",
                schema.tag
            ));
        }

        let mut validator = Self {
            elements: HashMap::new(),
            complex_types: HashMap::new(),
            simple_types: HashMap::new(),
        };
        for declaration in &schema.children {
            let Some(name) = declaration.attribute("name") else {
                continue;
            };
            match local(&declaration.tag) {
                "element" => validator.elements.insert(name, declaration),
                "complexType" => validator.complex_types.insert(name, declaration),
                "simpleType" => validator.simple_types.insert(name, declaration),
                _ => None,
            };
        }

        if validator.elements.is_empty() {
            return Err("schema declares no global elements".to_string());
        }
        Ok(validator)
    }

    /// Validate a document, returning every violation found
    pub fn validate(&self, document: &HierarchicalNode) -> Vec<String> {
        let mut errors = Vec::new();
        let path = format!("/{}", document.tag);
        match self.elements.get(local(&document.tag)) {
            Some(&declaration) => self.check_element(document, declaration, &path, &mut errors),
            None => errors.push(format!(
                "{}: no global declaration for root element <{}>",
                path, document.tag
            )),
        }
        errors
    }

    fn check_element(
        &self,
        node: &HierarchicalNode,
        declaration: &'s HierarchicalNode,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        if let Some(reference) = declaration.attribute("ref") {
            match self.elements.get(local(reference)) {
                Some(&global) => self.check_element(node, global, path, errors),
                None => errors.push(format!("{}: unresolved element reference '{}'", path, reference)),
            }
            return;
        }

        if let Some(type_name) = declaration.attribute("type") {
            if let Some(simple) = self.resolve_simple(type_name) {
                self.check_simple(node, simple, path, errors);
            } else if let Some(&complex) = self.complex_types.get(local(type_name)) {
                self.check_complex(node, complex, path, errors);
            }
            // anyType and unknown types accept any content
            return;
        }

        for definition in &declaration.children {
            match local(&definition.tag) {
                "complexType" => return self.check_complex(node, definition, path, errors),
                "simpleType" => {
                    let simple = self.simple_type_base(definition).unwrap_or(XsdType::String);
                    return self.check_simple(node, simple, path, errors);
                }
                _ => {}
            }
        }
    }

    fn resolve_simple(&self, type_name: &str) -> Option<XsdType> {
        XsdType::from_qualified_name(type_name).or_else(|| {
            self.simple_types
                .get(local(type_name))
                .and_then(|definition| self.simple_type_base(definition))
        })
    }

    fn simple_type_base(&self, definition: &HierarchicalNode) -> Option<XsdType> {
        definition
            .children
            .iter()
            .find(|c| is_schema_node(c, "restriction"))
            .and_then(|restriction| restriction.attribute("base"))
            .and_then(XsdType::from_qualified_name)
    }

    fn check_simple(
        &self,
        node: &HierarchicalNode,
        simple: XsdType,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        if !node.children.is_empty() {
            errors.push(format!("{}: simple-typed element must not contain child elements", path));
        }
        self.check_attributes(node, &[], false, path, errors);
        self.check_text(node, simple, path, errors);
    }

    fn check_text(
        &self,
        node: &HierarchicalNode,
        simple: XsdType,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        if node.attribute("null") == Some("true") {
            return;
        }
        let text = node.text().unwrap_or("");
        if !simple.accepts(text) {
            errors.push(format!(
                "{}: value '{}' is not a valid {}",
                path,
                text,
                simple.xsd_name()
            ));
        }
    }

    fn check_complex(
        &self,
        node: &HierarchicalNode,
        complex: &'s HierarchicalNode,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        let mixed = complex.attribute("mixed") == Some("true");
        let mut attributes: Vec<&HierarchicalNode> = Vec::new();
        let mut any_attribute = false;
        let mut group: Option<&HierarchicalNode> = None;

        for part in &complex.children {
            match local(&part.tag) {
                "attribute" => attributes.push(part),
                "anyAttribute" => any_attribute = true,
                "sequence" | "choice" | "all" => group = Some(part),
                "simpleContent" => {
                    return self.check_simple_content(node, part, path, errors);
                }
                // Derivation by complexContent is outside the subset: accept
                "complexContent" => return,
                _ => {}
            }
        }

        self.check_attributes(node, &attributes, any_attribute, path, errors);

        if node.text().is_some() && !mixed {
            errors.push(format!("{}: text content is not allowed here", path));
        }

        match group {
            Some(group) => {
                let mut position = 0;
                self.match_group(group, &node.children, &mut position, path, errors);
                if let Some(extra) = node.children.get(position) {
                    errors.push(format!("{}: unexpected element <{}>", path, extra.tag));
                }
            }
            None => {
                if let Some(child) = node.children.first() {
                    errors.push(format!("{}: unexpected element <{}>", path, child.tag));
                }
            }
        }
    }

    fn check_simple_content(
        &self,
        node: &HierarchicalNode,
        content: &HierarchicalNode,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        let Some(derivation) = content
            .children
            .iter()
            .find(|c| is_schema_node(c, "extension") || is_schema_node(c, "restriction"))
        else {
            return;
        };

        let attributes: Vec<&HierarchicalNode> = derivation
            .children
            .iter()
            .filter(|c| is_schema_node(c, "attribute"))
            .collect();
        let any_attribute = derivation.children.iter().any(|c| is_schema_node(c, "anyAttribute"));
        self.check_attributes(node, &attributes, any_attribute, path, errors);

        if !node.children.is_empty() {
            errors.push(format!("{}: element with simple content must not contain child elements", path));
        }
        let base = derivation
            .attribute("base")
            .and_then(|b| self.resolve_simple(b))
            .unwrap_or(XsdType::String);
        self.check_text(node, base, path, errors);
    }

    fn check_attributes(
        &self,
        node: &HierarchicalNode,
        declared: &[&HierarchicalNode],
        any_attribute: bool,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        let mut names = Vec::with_capacity(declared.len());
        for declaration in declared {
            let Some(name) = declaration
                .attribute("name")
                .or_else(|| declaration.attribute("ref"))
                .map(local)
            else {
                continue;
            };
            names.push(name);

            match node.attribute(name) {
                Some(value) => {
                    let expected = declaration
                        .attribute("type")
                        .and_then(|t| self.resolve_simple(t));
                    if let Some(expected) = expected {
                        if !expected.accepts(value) {
                            errors.push(format!(
                                "{}/@{}: value '{}' is not a valid {}",
                                path,
                                name,
                                value,
                                expected.xsd_name()
                            ));
                        }
                    }
                }
                None if declaration.attribute("use") == Some("required") => {
                    errors.push(format!("{}: missing required attribute '{}'", path, name));
                }
                None => {}
            }
        }

        if any_attribute {
            return;
        }
        for (name, _) in node.attributes.iter() {
            if name.starts_with("xmlns") || name.starts_with("xml:") || name.starts_with("xsi:") {
                continue;
            }
            if !names.contains(&name) {
                errors.push(format!("{}: attribute '{}' is not declared", path, name));
            }
        }
    }

    /// Consume children matching a model group starting at `position`.
    /// Returns how many children were consumed.
    fn match_group(
        &self,
        group: &'s HierarchicalNode,
        children: &[HierarchicalNode],
        position: &mut usize,
        path: &str,
        errors: &mut Vec<String>,
    ) -> usize {
        let start = *position;
        let particles: Vec<&HierarchicalNode> = group
            .children
            .iter()
            .filter(|p| matches!(local(&p.tag), "element" | "any" | "sequence" | "choice"))
            .collect();

        match local(&group.tag) {
            "choice" => {
                let (min, max) = occurs(group);
                let mut count = 0;
                while count < max && *position < children.len() {
                    let child = &children[*position];
                    let Some(particle) = particles
                        .iter()
                        .copied()
                        .find(|p| self.particle_accepts(p, child))
                    else {
                        break;
                    };
                    self.check_particle(particle, child, path, errors);
                    *position += 1;
                    count += 1;
                }
                if count < min {
                    errors.push(format!("{}: expected one of the choice alternatives", path));
                }
            }
            "all" => {
                for particle in &particles {
                    let (min, _) = occurs(particle);
                    let name = particle_name(particle);
                    let found = children[*position..]
                        .iter()
                        .filter(|c| name.is_some_and(|n| local(&c.tag) == n))
                        .count();
                    if found < min {
                        if let Some(name) = name {
                            errors.push(format!("{}: missing element <{}>", path, name));
                        }
                    }
                }
                while *position < children.len() {
                    let child = &children[*position];
                    match particles
                        .iter()
                        .copied()
                        .find(|p| self.particle_accepts(p, child))
                    {
                        Some(particle) => self.check_particle(particle, child, path, errors),
                        None => break,
                    }
                    *position += 1;
                }
            }
            _ => {
                for particle in particles {
                    let (min, max) = occurs(particle);
                    let mut count = 0;
                    if matches!(local(&particle.tag), "sequence" | "choice") {
                        while count < max {
                            let mut attempt = Vec::new();
                            let consumed =
                                self.match_group(particle, children, position, path, &mut attempt);
                            if consumed == 0 {
                                if count < min {
                                    errors.extend(attempt);
                                }
                                break;
                            }
                            errors.extend(attempt);
                            count += 1;
                        }
                        continue;
                    }
                    while count < max
                        && *position < children.len()
                        && self.particle_accepts(particle, &children[*position])
                    {
                        self.check_particle(particle, &children[*position], path, errors);
                        *position += 1;
                        count += 1;
                    }
                    if count < min {
                        let expected = particle_name(particle).unwrap_or("any element");
                        errors.push(format!(
                            "{}: expected <{}> at least {} time(s), found {}",
                            path, expected, min, count
                        ));
                    }
                }
            }
        }

        *position - start
    }

    fn particle_accepts(&self, particle: &HierarchicalNode, child: &HierarchicalNode) -> bool {
        match local(&particle.tag) {
            "any" => true,
            "element" => particle_name(particle) == Some(local(&child.tag)),
            _ => false,
        }
    }

    fn check_particle(
        &self,
        particle: &'s HierarchicalNode,
        child: &HierarchicalNode,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        let child_path = format!("{}/{}", path, child.tag);
        if local(&particle.tag) == "element" {
            return self.check_element(child, particle, &child_path, errors);
        }

        match particle.attribute("processContents").unwrap_or("strict") {
            "skip" => {}
            mode => match self.elements.get(local(&child.tag)) {
                Some(&global) => self.check_element(child, global, &child_path, errors),
                None if mode == "strict" => errors.push(format!(
                    "{}: no declaration for <{}>",
                    child_path, child.tag
                )),
                None => self.check_lax(child, &child_path, errors),
            },
        }
    }

    /// Lax assessment of undeclared content: declared descendants are still checked
    fn check_lax(&self, node: &HierarchicalNode, path: &str, errors: &mut Vec<String>) {
        for child in &node.children {
            let child_path = format!("{}/{}", path, child.tag);
            match self.elements.get(local(&child.tag)) {
                Some(&global) => self.check_element(child, global, &child_path, errors),
                None => self.check_lax(child, &child_path, errors),
            }
        }
    }
}

fn particle_name(particle: &HierarchicalNode) -> Option<&str> {
    particle
        .attribute("name")
        .or_else(|| particle.attribute("ref"))
        .map(local)
}
