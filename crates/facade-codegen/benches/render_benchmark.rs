//! Performance benchmarks for facade-codegen.
//!
//! Measures type rendering for increasingly nested annotations and full
//! synthesis plus emission for packages of different sizes.
//!
//! Run with: cargo bench --package facade-codegen

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use facade_codegen::{EmissionAssembler, EmitOptions, FacadeSynthesizer, TypeRenderer};
use facade_core::{GeneratorConfig, ModulePath, NamespaceName, PackageName};
use facade_introspector::{
    CallableSignature, DefaultValue, EndpointDescriptor, EndpointMap, ParameterInfo, QualifiedName,
    TypeDescriptor,
};
use std::hint::black_box;

fn model(index: usize) -> TypeDescriptor {
    TypeDescriptor::Named(QualifiedName::new(
        format!("bench_client.models.model_{index}"),
        format!("Model{index}"),
    ))
}

/// `Optional[Dict[str, List[...List[Model0]...]]]` nested `depth` times.
fn nested(depth: usize) -> TypeDescriptor {
    let mut inner = model(0);
    for _ in 0..depth {
        inner = TypeDescriptor::Generic {
            origin: QualifiedName::typing("List"),
            args: vec![inner],
        };
    }
    TypeDescriptor::optional(TypeDescriptor::Generic {
        origin: QualifiedName::typing("Dict"),
        args: vec![
            TypeDescriptor::Primitive {
                name: "str".to_string(),
            },
            inner,
        ],
    })
}

fn signature(function: &str, index: usize) -> CallableSignature {
    CallableSignature {
        function: function.to_string(),
        parameters: vec![
            ParameterInfo {
                name: "body".to_string(),
                descriptor: model(index),
                default: None,
            },
            ParameterInfo {
                name: "page".to_string(),
                descriptor: TypeDescriptor::union([
                    TypeDescriptor::Named(QualifiedName::new("bench_client.types", "Unset")),
                    TypeDescriptor::Primitive {
                        name: "int".to_string(),
                    },
                ]),
                default: Some(DefaultValue::UnsetSentinel),
            },
        ],
        returns: nested(index % 4),
        is_coroutine: function == "asyncio",
    }
}

fn endpoints(namespaces: usize, per_namespace: usize) -> EndpointMap {
    let mut map = EndpointMap::new();
    for ns in 0..namespaces {
        let namespace = if ns == 0 {
            NamespaceName::new("default")
        } else {
            NamespaceName::new(format!("tag_{ns}"))
        };
        let list = (0..per_namespace)
            .map(|i| EndpointDescriptor {
                namespace: namespace.clone(),
                name: format!("operation_{i}"),
                module: ModulePath::new(format!("bench_client.api.{namespace}.operation_{i}")),
                sync: Some(signature("sync", i)),
                asyncio: Some(signature("asyncio", i)),
            })
            .collect();
        map.insert(namespace, list);
    }
    map
}

fn bench_render(c: &mut Criterion) {
    let renderer = TypeRenderer::new(&ModulePath::new("bench_client"), &GeneratorConfig::default());
    let mut group = c.benchmark_group("render_type");

    for depth in [0, 2, 8, 32] {
        let descriptor = nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &descriptor, |b, d| {
            b.iter(|| renderer.render(black_box(d)));
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    let package = PackageName::new("bench_client").unwrap();
    let assembler = EmissionAssembler::new(config.clone()).unwrap();
    let mut group = c.benchmark_group("synthesize_and_emit");

    for (namespaces, per_namespace) in [(1, 5), (5, 10), (20, 25)] {
        let map = endpoints(namespaces, per_namespace);
        group.throughput(Throughput::Elements((namespaces * per_namespace) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{namespaces}x{per_namespace}")),
            &map,
            |b, map| {
                b.iter(|| {
                    let set = FacadeSynthesizer::new(&ModulePath::from(&package), &config)
                        .synthesize(black_box(map), "BenchClient");
                    assembler.emit(&set, &EmitOptions::new(package.clone())).unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_generate);
criterion_main!(benches);
