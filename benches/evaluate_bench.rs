use criterion::{criterion_group, criterion_main, Criterion, black_box};
use cozy_chess::Board;
use piebridge::Session;

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_eval(c: &mut Criterion) {
    let b = Board::default();
    c.bench_function("eval_cp_startpos", |ben| {
        ben.iter(|| black_box(piebridge::search::eval::eval_cp(black_box(&b))))
    });
}

fn bench_session(c: &mut Criterion) {
    let mut session = Session::default();
    session.init(None, None);
    c.bench_function("evaluate_startpos_d4", |ben| {
        ben.iter(|| black_box(session.evaluate(black_box(STARTPOS), 4).len()))
    });
    c.bench_function("evaluate_multipv_kiwipete_d3x3", |ben| {
        ben.iter(|| black_box(session.evaluate_multipv(black_box(KIWIPETE), 3, 3).len()))
    });
    session.cleanup();
}

criterion_group!(benches, bench_eval, bench_session);
criterion_main!(benches);
