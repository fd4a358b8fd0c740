//! Drives the local renamer, lambda registry and parameter recorder together, the way a class
//! rewrite pass would.

use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::descriptor::MethodDescriptor;
use plume::tree::names::MethodName;
use plumebox::{LambdaRegistry, LocalRenamer, ParameterRecorder};

#[test]
fn rewriting_a_method_with_a_lambda() -> Result<()> {
	let mut registry = LambdaRegistry::new();
	let mut recorder = ParameterRecorder::new();
	recorder.start()?;

	// the enclosing method: `void update(String name, int count)` on an instance
	let mut enclosing = LocalRenamer::new();
	enclosing.assign(0, "Lcom/example/Config;", Some("this"))?;
	let name = enclosing.assign(1, "Ljava/lang/String;", Some("name"))?.to_owned();
	let count = enclosing.assign(2, "I", None)?.to_owned();
	assert_eq!(name, "name");
	assert_eq!(count, "int");

	recorder.record(
		&"com/example/Config".into(),
		&"update".into(),
		&"(Ljava/lang/String;I)V".into(),
		&[name.as_str().into(), count.as_str().into()],
	)?;

	// an invokedynamic with two captured arguments registers the lambda body
	let lambda_name: MethodName = "lambda$update$0".into();
	let lambda_desc: MethodDescriptor = "(Ljava/lang/String;I)V".into();
	registry.register(lambda_name.clone(), lambda_desc.clone(), LocalRenamer::seeded(&enclosing, 2))?;

	// the lambda body is visited later; names beyond the captured prefix carry over
	let mut lambda = registry.claim(&lambda_name, &lambda_desc).expect("registered above");
	assert_eq!(lambda.get(2), Some("int"));
	assert_eq!(lambda.get(0), None);
	let fresh = lambda.assign(3, "Ljava/util/List;", None)?.to_owned();
	assert_eq!(fresh, "list");

	recorder.end()?;
	assert_eq!(recorder.rows(), ["com/example/Config update (Ljava/lang/String;I)V name int"]);

	let mut out = Vec::new();
	recorder.write(&mut out)?;
	assert_eq!(out, b"com/example/Config update (Ljava/lang/String;I)V name int\n");
	Ok(())
}

#[test]
fn lambda_bodies_visited_before_their_invokedynamic() {
	let mut registry = LambdaRegistry::new();
	let name: MethodName = "lambda$run$0".into();
	let desc: MethodDescriptor = "()V".into();

	// the class file lists the body first, so the claim misses and a fresh renamer is handed out
	let _renamer = registry.claim_or_fresh(&name, &desc);

	// once the invokedynamic is seen, the miss shows up for a second pass
	registry.register(name.clone(), desc.clone(), LocalRenamer::new()).unwrap();
	let early: Vec<_> = registry.visited_early().collect();
	assert_eq!(early, [(&name, &desc)]);
}
