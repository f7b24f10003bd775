#![allow(missing_docs)]
#![allow(dead_code)]

pub const DOCUMENT: &str = r#"
;; A small deps-style configuration.
{:paths ["src" "resources"]
 :deps {org.clojure/clojure {:mvn/version "1.11.1"}
        some.lib/core #:git{:url "https://example.com/lib.git", :sha "abc123"}}
 :aliases
 {:test {:extra-paths ["test"]
         :main-opts ["-m" "runner"]
         :jvm-opts ^:replace ["-Xmx1g"]}}
 :limits {:ratio 3/4, :max 9223372036854775808, :min -9223372036854775808, :pi 3.14159, :cost 12.50M}
 :chars [\a \space \é \o101 \newline]
 :flags #{:fast :safe}
 :stamp #inst "2020-01-01T00:00:00Z"
 :floats [##Inf ##-Inf 1e-7]
 #_ :ignored #_ "entirely"
 :text "line one\nline \"two\"\t☺"}
"#;

pub const STREAM: [&str; 6] = [
    "(def x ",
    "{:a [1 2",
    " 3] :b #{",
    "\"s\"}})\n",
    "^{:doc \"y\"} [",
    "x y]",
];
