// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of a full extraction over synthetic models.
//!
//! Run with: cargo bench -p ifc-extract-parser --bench extract

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ifc_extract_model::BuildingExtractor;
use ifc_extract_parser::StepExtractor;
use std::fmt::Write;

/// Generate a model with `storeys` storeys of `walls_per_storey` layered walls
fn generate_model(storeys: usize, walls_per_storey: usize) -> String {
    let mut out = String::from(
        "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
         #1=IFCPROJECT('p',$,'Bench',$,$,$,$,$,#2);\n\
         #2=IFCUNITASSIGNMENT((#3));\n\
         #3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
         #4=IFCMATERIAL('Brick',$,$);\n\
         #5=IFCMATERIAL('Insulation',$,$);\n\
         #6=IFCMATERIALLAYER(#4,100.,$,'Outer',$,$,$);\n\
         #7=IFCMATERIALLAYER(#5,300.,$,$,$,$,$);\n\
         #8=IFCMATERIALLAYERSET((#6,#7),'Cavity',$);\n\
         #9=IFCMATERIALLAYERSETUSAGE(#8,.AXIS2.,.POSITIVE.,0.,$);\n",
    );

    let mut next = 100u32;
    for storey in 0..storeys {
        let storey_id = next;
        let _ = writeln!(
            out,
            "#{storey_id}=IFCBUILDINGSTOREY('s{storey}',$,'Level {storey}',$,$,$,$,$,.ELEMENT.,{}.);",
            storey * 3000
        );
        next += 1;

        let mut walls = Vec::with_capacity(walls_per_storey);
        for wall in 0..walls_per_storey {
            let (wall_id, shape, rep, volume, qset, rel) =
                (next, next + 1, next + 2, next + 3, next + 4, next + 5);
            next += 6;
            walls.push(format!("#{wall_id}"));

            let _ = writeln!(
                out,
                "#{wall_id}=IFCWALL('w{wall_id}',$,'Wall {storey}-{wall}',$,$,$,#{shape},$,$);\n\
                 #{shape}=IFCPRODUCTDEFINITIONSHAPE($,$,(#{rep}));\n\
                 #{rep}=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',());\n\
                 #{volume}=IFCQUANTITYVOLUME('NetVolume',$,$,{}.5,$);\n\
                 #{qset}=IFCELEMENTQUANTITY('q{wall_id}',$,'Qto_WallBaseQuantities',$,$,(#{volume}));\n\
                 #{rel}=IFCRELDEFINESBYPROPERTIES('r{wall_id}',$,$,$,(#{wall_id}),#{qset});",
                wall % 7 + 1
            );
        }

        let list = walls.join(",");
        let _ = writeln!(
            out,
            "#{}=IFCRELCONTAINEDINSPATIALSTRUCTURE('c{storey}',$,$,$,({list}),#{storey_id});\n\
             #{}=IFCRELASSOCIATESMATERIAL('m{storey}',$,$,$,({list}),#9);",
            next,
            next + 1
        );
        next += 2;
    }

    out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    out
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    let scenarios = [("small", 2, 50), ("medium", 5, 400), ("large", 10, 2000)];

    for (name, storeys, walls_per_storey) in scenarios {
        let content = generate_model(storeys, walls_per_storey);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("full", name), &content, |b, content| {
            let extractor = StepExtractor::new();
            b.iter(|| extractor.extract(black_box(content)))
        });

        group.bench_with_input(
            BenchmarkId::new("semantic_only", name),
            &content,
            |b, content| {
                let extractor = StepExtractor::new().with_geometry(false);
                b.iter(|| extractor.extract(black_box(content)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
