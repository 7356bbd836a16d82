//! Canvas 脚本绑定测试

use super::Harness;
use crate::native::FailPoint;
use crate::Color;

/// 测试基本场景：红色 10x10 方块
#[test]
fn test_red_square_scenario() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(100, 50);
         c.setFillColor(255, 0, 0, 255);
         c.beginPath();
         c.fillRect(0, 0, 10, 10);
         c.fill();
         c.show();",
    );
    assert_eq!(h.eval("c.getPixel(0, 0).join(',')"), "255,0,0,255");
    assert_eq!(h.eval("c.getPixel(9, 9).join(',')"), "255,0,0,255");
    assert_eq!(h.eval("c.getPixel(10, 10).join(',')"), "255,255,255,255");

    // show 之后没有残留纹理，画面已呈现
    let live = h.monitor.resources();
    assert_eq!(live.textures, 0);
    assert_eq!(live.windows, 1);
    assert_eq!(h.monitor.present_count(), 1);
    let frame = h.monitor.last_frame().unwrap();
    assert_eq!((frame.width, frame.height), (100, 50));
    assert_eq!(frame.pixel(5, 5), Color::RED);
    assert_eq!(frame.pixel(50, 25), Color::WHITE);
}

/// 测试宽高属性
#[test]
fn test_width_height_getters() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(320, 240);");
    assert_eq!(h.eval("c.width"), "320");
    assert_eq!(h.eval("c.height"), "240");
    assert_eq!(h.eval("c instanceof Canvas"), "true");
}

/// 测试新画布为不透明白色
#[test]
fn test_new_canvas_is_white() {
    let h = Harness::new();
    let all_white = h.eval(
        "(() => {
            const c = new Canvas(16, 8);
            for (let y = 0; y < 8; y++)
                for (let x = 0; x < 16; x++)
                    if (c.getPixel(x, y).join(',') !== '255,255,255,255') return false;
            return true;
        })()",
    );
    assert_eq!(all_white, "true");
}

/// 测试尺寸为 0 的画布
#[test]
fn test_zero_size_canvas_fails() {
    let h = Harness::new();
    assert_eq!(h.error_name("new Canvas(0, 0)"), "NativeResourceError");
    assert_eq!(h.error_name("new Canvas(-5, 10)"), "NativeResourceError");
    assert!(h.monitor.resources().is_empty());
}

/// 测试参数个数校验
#[test]
fn test_argument_count() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10);");
    assert_eq!(h.error_name("c.arc(1, 2)"), "ArgumentCountError");
    assert_eq!(
        h.error_message("c.arc(1, 2)"),
        "canvas.arc() expected 5 or 6 arguments, but got 2"
    );
    assert_eq!(h.error_name("c.fillRect(0, 0, 1)"), "ArgumentCountError");
    assert_eq!(h.error_name("c.setFillColor(1, 2)"), "ArgumentCountError");
    assert_eq!(h.error_name("c.show(1)"), "ArgumentCountError");
    assert_eq!(h.error_name("new Canvas(10)"), "ArgumentCountError");
    // 个数校验先于类型转换
    assert_eq!(h.error_name("c.arc('x')"), "ArgumentCountError");
}

/// 测试参数类型转换
#[test]
fn test_type_conversion() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10);");
    assert_eq!(h.error_name("c.fillRect('a', 0, 1, 1)"), "TypeConversion");
    assert_eq!(h.error_name("c.fillRect(undefined, 0, 1, 1)"), "TypeConversion");
    assert_eq!(h.error_name("c.arc(1, 2, 3, 0, {})"), "TypeConversion");
    assert_eq!(h.error_name("new Canvas('wide', 10)"), "TypeConversion");
    assert_eq!(h.error_name("c.fillRect('3', 0, 1, 1)"), "no error");
    assert_eq!(h.error_name("c.arc(5, 5, 2, 0, 6.3, 1)"), "no error");
    // 转换失败时不应产生任何绘制
    assert_eq!(h.eval("c.getPixel(0, 0).join(',')"), "255,255,255,255");
}

/// 测试 close 之后的调用
#[test]
fn test_invalid_receiver_after_close() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10); c.close();");
    assert!(h.monitor.resources().is_empty());
    assert_eq!(h.error_name("c.fill()"), "InvalidReceiver");
    assert_eq!(h.error_name("c.width"), "InvalidReceiver");
    assert_eq!(h.error_name("c.pollEvent()"), "InvalidReceiver");
    assert_eq!(h.error_name("c.close()"), "no error");
}

/// 测试已关闭画布先报告接收者错误，不再转换参数
#[test]
fn test_closed_receiver_checked_before_conversion() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(10, 10);
         c.close();
         globalThis.touched = false;
         globalThis.sideEffect = { valueOf() { touched = true; return 1; } };",
    );
    assert_eq!(h.error_name("c.fillRect('a', 0, 1, 1)"), "InvalidReceiver");
    assert_eq!(h.error_name("c.arc(sideEffect, 0, 1, 0, 1)"), "InvalidReceiver");
    assert_eq!(h.error_name("c.setFillColor(sideEffect, 0, 0)"), "InvalidReceiver");
    assert_eq!(h.eval("touched"), "false");
    assert_eq!(h.error_name("c.fillRect(1, 2)"), "ArgumentCountError");
}

/// 测试非 Canvas 接收者
#[test]
fn test_foreign_receiver_throws() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10);");
    assert_eq!(h.error_name("Canvas.prototype.fill.call({})"), "InvalidReceiver");
    assert_eq!(h.error_name("Canvas.prototype.fillRect.call(42, 0, 0, 1, 1)"), "InvalidReceiver");
    assert_eq!(
        h.error_name("Object.getOwnPropertyDescriptor(Canvas.prototype, 'width').get.call({})"),
        "InvalidReceiver"
    );
    assert_eq!(h.error_name("Canvas.prototype.close.call({})"), "InvalidReceiver");
    // 个数校验仍然先于接收者检查
    assert_eq!(h.error_name("Canvas.prototype.fill.call({}, 1)"), "ArgumentCountError");
    assert_eq!(h.error_name("c.fill()"), "no error");
}

/// 测试垃圾回收释放原生资源
#[test]
fn test_finalizer_releases_handles() {
    let h = Harness::new();
    h.eval("(() => { const tmp = new Canvas(8, 8); tmp.show(); })()");
    h.rt.collect_garbage();
    assert!(h.monitor.resources().is_empty());
}

/// 测试构造中途失败
#[test]
fn test_partial_construction_releases_window() {
    let h = Harness::new();
    h.monitor.fail_next(FailPoint::CreateRenderer);
    assert_eq!(h.error_name("new Canvas(10, 10)"), "NativeResourceError");
    assert!(h.monitor.resources().is_empty());
    assert_eq!(h.error_name("new Canvas(10, 10)"), "no error");
}

/// 测试 show 失败时纹理被释放
#[test]
fn test_show_failure_releases_texture() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10);");
    h.monitor.fail_next(FailPoint::Present);
    assert_eq!(h.error_name("c.show()"), "NativeResourceError");
    assert_eq!(h.monitor.resources().textures, 0);
    h.monitor.fail_next(FailPoint::CreateTexture);
    assert_eq!(h.error_name("c.show()"), "NativeResourceError");
    assert_eq!(h.monitor.resources().textures, 0);
    assert_eq!(h.error_name("c.show()"), "no error");
}

/// 测试填充颜色后写覆盖
#[test]
fn test_set_fill_color_last_write_wins() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(10, 10);
         c.setFillColor(255, 0, 0, 255);
         c.setFillColor(0, 0, 255);
         c.beginPath();
         c.arc(5, 5, 4, 0, Math.PI * 2);
         c.fill();",
    );
    assert_eq!(h.eval("c.getPixel(5, 5).join(',')"), "0,0,255,255");
}

/// 测试 fill 之后路径被清空
#[test]
fn test_fill_consumes_path() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(40, 20);
         c.setFillColor(255, 0, 0);
         c.arc(10, 10, 5, 0, Math.PI * 2);
         c.fill();
         c.setFillColor(0, 0, 255);
         c.arc(30, 10, 5, 0, Math.PI * 2);
         c.fill();",
    );
    assert_eq!(h.eval("c.getPixel(10, 10).join(',')"), "255,0,0,255");
    assert_eq!(h.eval("c.getPixel(30, 10).join(',')"), "0,0,255,255");
    assert_eq!(h.eval("c.getPixel(20, 10).join(',')"), "255,255,255,255");
    // 空路径上的 fill 不绘制
    h.eval("c.setFillColor(0, 255, 0); c.fill();");
    assert_eq!(h.eval("c.getPixel(10, 10).join(',')"), "255,0,0,255");
}

/// 测试圆弧填充只覆盖圆内
#[test]
fn test_arc_fill() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(40, 40);
         c.setFillColor(0, 255, 0);
         c.beginPath();
         c.arc(20, 20, 10, 0, Math.PI * 2);
         c.fill();",
    );
    assert_eq!(h.eval("c.getPixel(20, 20).join(',')"), "0,255,0,255");
    assert_eq!(h.eval("c.getPixel(2, 2).join(',')"), "255,255,255,255");
    assert_eq!(h.eval("c.getPixel(20, 35).join(',')"), "255,255,255,255");
}

/// 测试全局透明度
#[test]
fn test_global_alpha() {
    let h = Harness::new();
    h.eval(
        "globalThis.c = new Canvas(10, 10);
         c.setFillColor(255, 0, 0);
         c.setGlobalAlpha(0.5);
         c.fillRect(0, 0, 10, 10);",
    );
    let g: u32 = h.eval("c.getPixel(5, 5)[1]").parse().unwrap();
    assert!((120..=135).contains(&g), "green {}", g);
    assert_eq!(h.eval("c.getPixel(5, 5)[0]"), "255");
}

/// 测试 clear 和 clearRect
#[test]
fn test_clear_and_clear_rect() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10); c.clearRect(0, 0, 5, 5);");
    assert_eq!(h.eval("c.getPixel(2, 2).join(',')"), "0,0,0,0");
    assert_eq!(h.eval("c.getPixel(7, 7).join(',')"), "255,255,255,255");
    h.eval("c.clear();");
    assert_eq!(h.eval("c.getPixel(7, 7).join(',')"), "0,0,0,0");
}

/// 测试 pollEvent 空队列与 quit
#[test]
fn test_poll_empty_queue_and_quit() {
    let h = Harness::new();
    h.eval("globalThis.c = new Canvas(10, 10);");
    assert_eq!(h.eval("c.pollEvent() === undefined"), "true");
    assert_eq!(h.error_name("c.quit()"), "no error");
}

/// 测试导出 PNG
#[test]
fn test_save_png() {
    let h = Harness::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let path_js = serde_json::to_string(&path.display().to_string()).unwrap();
    h.eval(&format!(
        "globalThis.c = new Canvas(6, 4); c.setFillColor(0, 0, 255); c.fillRect(0, 0, 3, 4); c.savePng({});",
        path_js
    ));
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (6, 4));
    assert_eq!(img.get_pixel(1, 1).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(4, 1).0, [255, 255, 255, 255]);
    assert_eq!(h.error_name("c.savePng(42)"), "TypeConversion");
}
