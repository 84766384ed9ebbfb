//! Foreign keys derived from association join criteria.
//!
//! A relationship such as `this.id == Answer.questionId` pairs a key on one
//! side with a foreign key on the other. The pairs are recorded on both
//! properties, keyed by association end.

use crate::error::CompileError;

use super::criteria::{Criteria, ExpressionValue, MemberReference, Operator, Scaffolded};
use super::ids::{AssociationId, ClassifierId, PropertyId, ReferenceId};
use super::scaffold::Scaffold;
use super::types::EndPosition;

/// One `this.a == Type.b` comparison, resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pair {
    this_property: PropertyId,
    type_property: PropertyId,
}

/// Fill the foreign-key maps of every property taking part in a join.
pub fn derive_foreign_keys(scaffold: &mut Scaffold) -> Result<(), CompileError> {
    let _span = tracing::debug_span!("foreign_keys").entered();

    let mut derived = Vec::new();
    for (id, _) in scaffold.associations() {
        if let Some(found) = association_foreign_keys(scaffold, id) {
            derived.push(found);
        }
    }

    let mut count = 0;
    for (end, pairs) in derived {
        let opposite = scaffold.opposite(end).ok_or_else(|| CompileError::unresolved("opposite"))?;
        for (foreign_key, key) in pairs {
            scaffold
                .property_mut(foreign_key)
                .keys_matching_this_foreign_key
                .entry(end)
                .or_default()
                .push(key);
            scaffold
                .property_mut(key)
                .foreign_keys_matching_this_key
                .entry(opposite)
                .or_default()
                .push(foreign_key);
            count += 1;
        }
    }
    tracing::debug!(foreign_keys = count, "foreign keys derived");
    Ok(())
}

/// The end holding the foreign keys and the `(foreign key, key)` pairs.
fn association_foreign_keys(
    scaffold: &Scaffold,
    association: AssociationId,
) -> Option<(ReferenceId, Vec<(PropertyId, PropertyId)>)> {
    let scaffold_association = scaffold.association(association);
    let criteria = scaffold_association.criteria.get()?;
    let source = scaffold_association.end(EndPosition::Source);
    let target = scaffold_association.end(EndPosition::Target);
    let this_class = scaffold.reference(source).resolved_target()?;
    let type_class = scaffold.reference(target).resolved_target()?;

    let mut pairs = Vec::new();
    collect_pairs(criteria, this_class, type_class, &mut pairs)?;
    if pairs.is_empty() {
        return None;
    }

    let end = foreign_key_end(scaffold, source, target)?;
    let end_owner = scaffold.reference(end).resolved_owner()?;
    let pairs = pairs
        .into_iter()
        .map(|pair| {
            if end_owner == this_class {
                (pair.this_property, pair.type_property)
            } else {
                (pair.type_property, pair.this_property)
            }
        })
        .collect();
    Some((end, pairs))
}

/// `None` if any part of the criteria cannot express a key join.
fn collect_pairs(
    criteria: &Criteria<Scaffolded>,
    this_class: ClassifierId,
    type_class: ClassifierId,
    pairs: &mut Vec<Pair>,
) -> Option<()> {
    match criteria {
        Criteria::And(lhs, rhs) => {
            collect_pairs(lhs, this_class, type_class, pairs)?;
            collect_pairs(rhs, this_class, type_class, pairs)
        }
        Criteria::Operator(op) if op.operator == Operator::Equals => {
            let (this_member, type_member) = match (&op.source, &op.target) {
                (ExpressionValue::ThisMember(a), ExpressionValue::TypeMember(b))
                | (ExpressionValue::TypeMember(b), ExpressionValue::ThisMember(a)) => (a, b),
                _ => return None,
            };
            pairs.push(Pair {
                this_property: direct_property(this_member, this_class)?,
                type_property: direct_property(type_member, type_class)?,
            });
            Some(())
        }
        Criteria::Operator(_) | Criteria::Or(..) | Criteria::All | Criteria::EdgePoint(_) | Criteria::Native(_) => None,
    }
}

fn direct_property(member: &MemberReference, expected: ClassifierId) -> Option<PropertyId> {
    if !member.is_direct() || member.classifier.resolved()? != expected {
        return None;
    }
    member.property.resolved()
}

/// The to-one end whose opposite is to-many; between two to-one ends, the
/// one whose opposite is `owned`, else the target.
fn foreign_key_end(scaffold: &Scaffold, source: ReferenceId, target: ReferenceId) -> Option<ReferenceId> {
    let source_end = scaffold.reference(source);
    let target_end = scaffold.reference(target);
    let source_multiplicity = source_end.multiplicity?;
    let target_multiplicity = target_end.multiplicity?;

    match (source_multiplicity.is_to_one(), target_multiplicity.is_to_one()) {
        (true, false) => Some(source),
        (false, true) => Some(target),
        (true, true) if target_end.has_modifier("owned") => Some(source),
        (true, true) => Some(target),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::hir::test_support::{property_named, scaffold_of};

    #[test]
    fn test_question_answer_foreign_key() {
        let (scaffold, _) = scaffold_of(&[
            "package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
                 relationship this.id == Answer.questionId\n\
             }",
        ]);
        let question_id = property_named(&scaffold, "Question", "id");
        let foreign_key = property_named(&scaffold, "Answer", "questionId");
        let (_, association) = scaffold.associations().next().unwrap();
        let [question_end, answers_end] = association.ends;

        let fk = scaffold.property(foreign_key);
        assert_eq!(fk.keys_matching_this_foreign_key.get(&question_end), Some(&vec![question_id]));
        let key = scaffold.property(question_id);
        assert_eq!(key.foreign_keys_matching_this_key.get(&answers_end), Some(&vec![foreign_key]));
        assert!(scaffold.property(property_named(&scaffold, "Answer", "id")).keys_matching_this_foreign_key.is_empty());
    }

    #[test]
    fn test_non_equality_join_has_no_foreign_keys() {
        let (scaffold, _) = scaffold_of(&[
            "package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
                 relationship this.id != Answer.questionId\n\
             }",
        ]);
        assert!(scaffold
            .properties()
            .all(|(_, p)| p.keys_matching_this_foreign_key.is_empty() && p.foreign_keys_matching_this_key.is_empty()));
    }

    #[test]
    fn test_one_to_one_owned_end() {
        let (scaffold, _) = scaffold_of(&[
            "package p\n\
             class Question { id: Long key; }\n\
             class Draft { questionId: Long key; }\n\
             association QuestionHasDraft {\n\
                 question: Question[1..1];\n\
                 draft: Draft[0..1] owned;\n\
                 relationship this.id == Draft.questionId\n\
             }",
        ]);
        let foreign_key = property_named(&scaffold, "Draft", "questionId");
        let (_, association) = scaffold.associations().next().unwrap();

        let fk = scaffold.property(foreign_key);
        assert!(fk.keys_matching_this_foreign_key.contains_key(&association.ends[0]));
    }
}
